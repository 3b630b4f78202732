//! Core data types for the DQM engine.
//!
//! ## Overview
//!
//! - **[`CellValue`]**: a scalar cell (null, bool, number or text)
//! - **[`Row`]** / **[`Dataset`]**: ordered records with inferred [`Column`] types
//! - **[`EngineConfig`]**: policies for a rule engine run
//! - **[`ExecutionResult`]**: row verdicts, aggregate failures and the [`Summary`]
//!
//! ## Data flow
//!
//! ```text
//! Dataset + RuleSet
//!     └── RuleEngine::execute
//!         ├── aggregate phase  → global_errors
//!         ├── row phase        → results[i].failure_reasons
//!         ├── duplicate check  → results[i].is_duplicate
//!         └── Summary
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dqm_guard::core::{ColumnType, Dataset, Row};
//!
//! let dataset = Dataset::from_rows(vec![
//!     Row::new().with("RID", "R-1").with("Area", 10),
//!     Row::new().with("RID", "R-2").with("Area", 12.5),
//! ]);
//!
//! assert_eq!(dataset.column("Area").unwrap().column_type, ColumnType::Number);
//! assert_eq!(dataset.column("RID").unwrap().column_type, ColumnType::String);
//! ```

pub mod config;
pub mod dataset;
pub mod result;
pub mod value;

pub use config::{EngineConfig, EngineConfigBuilder, MissingColumnPolicy};
pub use dataset::{
    Column, ColumnType, Dataset, HeaderMismatch, HeaderMode, HeaderValidation, Row,
};
pub use result::{
    EvaluationResult, ExecutionResult, FailureReason, ProfiledExecution, RuleEvaluation, Summary,
};
pub use value::{is_not_available, parse_number, CellValue, NOT_AVAILABLE};
