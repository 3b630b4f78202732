//! Exact per-column data profiling.
//!
//! The profiler makes one pass over every row and counts, per column:
//!
//! - blank cells (empty, whitespace-only or a lone `-`)
//! - spreadsheet error literals (`#DIV/0!`, `#REF!`, `#VALUE!`, `#N/A`)
//! - non-blank cells whose numeric value is zero
//! - distinct non-blank values, compared by their trimmed text
//!
//! Dataset-wide, it counts rows that repeat an earlier row field for field.
//! Nothing is sampled.
//!
//! # Example
//!
//! ```rust
//! use dqm_guard::analyzers::profiler::DataProfiler;
//! use dqm_guard::core::{Dataset, Row};
//!
//! let dataset = Dataset::from_rows(vec![
//!     Row::new().with("RID", "R1").with("Area", 0),
//!     Row::new().with("RID", "R2").with("Area", "#DIV/0!"),
//!     Row::new().with("RID", "R2").with("Area", "-"),
//! ]);
//!
//! let profile = DataProfiler::new().profile(&dataset);
//! let area = profile.column("Area").unwrap();
//! assert_eq!(area.blank_count, 1);
//! assert_eq!(area.error_marker_count, 1);
//! assert_eq!(area.zero_count, 1);
//! assert_eq!(profile.column("RID").unwrap().unique_value_count, 2);
//! ```

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::core::{CellValue, Dataset};
use crate::engine::duplicate_indices;
use crate::logging::LogConfig;

/// Counts for one column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name
    pub name: String,
    /// Cells that are empty, whitespace-only or `-`
    pub blank_count: usize,
    /// Cells holding a spreadsheet error literal
    pub error_marker_count: usize,
    /// Non-blank cells equal to zero
    pub zero_count: usize,
    /// Number of distinct non-blank values
    pub unique_value_count: usize,
}

/// Dataset-wide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileMetadata {
    /// Rows in the dataset
    pub total_rows: usize,
    /// Rows identical to an earlier row
    pub duplicate_row_count: usize,
}

/// Result of [`DataProfiler::profile`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataProfile {
    /// One entry per dataset column, in column order
    pub columns: Vec<ColumnProfile>,
    /// Dataset-wide counts
    pub metadata: ProfileMetadata,
}

impl DataProfile {
    /// Looks up the profile of a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Builds [`DataProfile`]s.
#[derive(Debug, Clone, Default)]
pub struct DataProfiler {
    log: LogConfig,
}

impl DataProfiler {
    /// Creates a profiler with the default log configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Profiles every column of `dataset`.
    #[instrument(skip(self, dataset), fields(rows = dataset.len(), columns = dataset.columns().len()))]
    pub fn profile(&self, dataset: &Dataset) -> DataProfile {
        let start = Instant::now();

        let columns: Vec<ColumnProfile> = dataset
            .column_names()
            .into_iter()
            .map(|name| profile_column(dataset, name))
            .collect();

        let metadata = ProfileMetadata {
            total_rows: dataset.len(),
            duplicate_row_count: duplicate_indices(dataset.rows()).len(),
        };

        if self.log.log_data_operations {
            info!(
                columns = columns.len(),
                rows = metadata.total_rows,
                duplicates = metadata.duplicate_row_count,
                duration_ms = start.elapsed().as_millis() as u64,
                "Profiled dataset"
            );
        }

        DataProfile { columns, metadata }
    }
}

fn profile_column(dataset: &Dataset, name: &str) -> ColumnProfile {
    let mut profile = ColumnProfile {
        name: name.to_string(),
        ..ColumnProfile::default()
    };
    let mut distinct: HashSet<String> = HashSet::new();

    for row in dataset.rows() {
        let value = row.get(name).unwrap_or(&CellValue::Null);

        if value.is_profile_blank() {
            profile.blank_count += 1;
            continue;
        }
        if value.is_error_marker() {
            profile.error_marker_count += 1;
        }
        if value.as_number() == Some(0.0) {
            profile.zero_count += 1;
        }
        distinct.insert(value.trimmed_text());
    }

    profile.unique_value_count = distinct.len();
    profile
}
