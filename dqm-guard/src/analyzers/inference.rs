//! Column type inference used when a dataset is loaded.
//!
//! Types are inferred once by sampling the first non-blank values of each
//! column. A column is [`ColumnType::Number`] when the share of sampled values
//! that parse as numbers reaches the configured threshold, and
//! [`ColumnType::String`] otherwise. Columns with no non-blank values are
//! strings.
//!
//! # Example
//!
//! ```rust
//! use dqm_guard::analyzers::inference::{ColumnTypeInference, InferenceConfig};
//! use dqm_guard::core::{ColumnType, Row};
//!
//! let rows = vec![
//!     Row::new().with("Area", "12.5"),
//!     Row::new().with("Area", 7),
//!     Row::new().with("Area", ""),
//! ];
//!
//! let inference = ColumnTypeInference::builder().sample_size(50).build();
//! assert_eq!(inference.infer(&rows, "Area"), ColumnType::Number);
//! assert_eq!(InferenceConfig::default().sample_size, 100);
//! ```

use crate::core::{ColumnType, Row};
use serde::{Deserialize, Serialize};

/// Configuration for column type inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Number of non-blank values to sample per column (default: 100)
    pub sample_size: usize,
    /// Minimum share of numeric samples for a numeric column (default: 0.9)
    pub numeric_threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            numeric_threshold: 0.9,
        }
    }
}

/// Sample statistics gathered for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeSample {
    /// Non-blank values inspected
    pub sampled: usize,
    /// Sampled values that parsed as numbers
    pub numeric: usize,
}

impl TypeSample {
    /// Share of numeric samples, 0 when nothing was sampled.
    pub fn numeric_ratio(&self) -> f64 {
        if self.sampled == 0 {
            0.0
        } else {
            self.numeric as f64 / self.sampled as f64
        }
    }
}

/// Infers [`ColumnType`]s from row samples.
#[derive(Debug, Clone, Default)]
pub struct ColumnTypeInference {
    config: InferenceConfig,
}

impl ColumnTypeInference {
    /// Creates an inference engine with the given configuration.
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Creates a builder for configuring the inference engine.
    pub fn builder() -> ColumnTypeInferenceBuilder {
        ColumnTypeInferenceBuilder::default()
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Samples up to `sample_size` non-blank values of `column`.
    pub fn sample(&self, rows: &[Row], column: &str) -> TypeSample {
        rows.iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_blank())
            .take(self.config.sample_size)
            .fold(TypeSample::default(), |mut acc, value| {
                acc.sampled += 1;
                if value.as_number().is_some() {
                    acc.numeric += 1;
                }
                acc
            })
    }

    /// Infers the type of `column` over `rows`.
    pub fn infer(&self, rows: &[Row], column: &str) -> ColumnType {
        let sample = self.sample(rows, column);
        if sample.sampled > 0 && sample.numeric_ratio() >= self.config.numeric_threshold {
            ColumnType::Number
        } else {
            ColumnType::String
        }
    }
}

/// Builder for [`ColumnTypeInference`].
#[derive(Debug, Clone, Default)]
pub struct ColumnTypeInferenceBuilder {
    config: InferenceConfig,
}

impl ColumnTypeInferenceBuilder {
    /// Sets the number of non-blank values sampled per column.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Sets the numeric share required for a numeric column.
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.config.numeric_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builds the inference engine.
    pub fn build(self) -> ColumnTypeInference {
        ColumnTypeInference::new(self.config)
    }
}
