//! Read-only diagnostics computed from a dataset.
//!
//! - [`inference`]: column type inference used at load time
//! - [`profiler`]: exact blank / error / zero / distinct counts per column
//! - [`quick_scan`]: duplicates, null rates, uniqueness and value ranges
//!
//! None of these evaluate rules and none of them can fail.
//!
//! ```rust
//! use dqm_guard::analyzers::{quick_scan, DataProfiler};
//! use dqm_guard::core::{Dataset, Row};
//!
//! let dataset = Dataset::from_rows(vec![
//!     Row::new().with("RID", "R1").with("Area", 12),
//!     Row::new().with("RID", "R2").with("Area", "#N/A"),
//! ]);
//!
//! let findings = quick_scan(&dataset);
//! assert_eq!(findings.column("Area").unwrap().null_count, 1);
//!
//! let profile = DataProfiler::new().profile(&dataset);
//! assert_eq!(profile.column("Area").unwrap().error_marker_count, 1);
//! ```

pub mod inference;
pub mod profiler;
pub mod quick_scan;

pub use inference::{ColumnTypeInference, ColumnTypeInferenceBuilder, InferenceConfig, TypeSample};
pub use profiler::{ColumnProfile, DataProfile, DataProfiler, ProfileMetadata};
pub use quick_scan::{
    quick_scan, ColumnMetrics, LengthRange, NumericRange, QuickScanFindings, QuickScanner,
    ScanStats,
};
