//! Prelude for commonly used types and traits in dqm-guard.

pub use crate::analyzers::{quick_scan, DataProfile, DataProfiler, QuickScanFindings};
pub use crate::core::{
    CellValue, ColumnType, Dataset, EngineConfig, ExecutionResult, MissingColumnPolicy, Row,
};
pub use crate::engine::RuleEngine;
pub use crate::error::{DqmError, ErrorContext, Result};
pub use crate::formatters::{DqmReport, FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::rules::{AggregateRule, RowRule, Rule, RuleKind, RuleSet};
pub use crate::sources::DataSource;
