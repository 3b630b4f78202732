//! Error types for the DQM engine.
//!
//! The evaluation core (operators, aggregation, rule engine, profilers) never
//! fails: malformed rules degrade to skips or vacuous passes and data problems
//! are reported as verdicts. `DqmError` covers the edges around that core:
//! rule-set mutation, rule-table import, header validation, data sources and
//! report formatting.

use thiserror::Error;

/// Errors raised outside the evaluation core.
#[derive(Error, Debug)]
pub enum DqmError {
    /// A file could not be read or parsed into rows.
    #[error("Data source error: {message}")]
    DataSource {
        /// Kind of source ("CSV", "JSON")
        source_type: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Invalid options passed to a source, formatter or logging setup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON or CSV encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No rule with this id in the rule set.
    #[error("Rule {id} not found")]
    RuleNotFound { id: u64 },

    /// Another rule in the rule set already uses this id.
    #[error("Rule id {id} is already in use")]
    DuplicateRuleId { id: u64 },

    /// A rule-table row that cannot be turned into a rule.
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },

    /// Uploaded headers do not match the expected layout.
    #[error("Header mismatch: {message}")]
    HeaderMismatch { message: String },

    /// A report could not be written.
    #[error("Report error: {0}")]
    Report(String),

    /// Another error with a note on what was being done.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<DqmError>,
    },
}

/// A type alias for `Result<T, DqmError>`.
pub type Result<T> = std::result::Result<T, DqmError>;

impl DqmError {
    /// A data source error caused by `source`.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn invalid_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// The innermost error, skipping [`DqmError::Context`] layers.
    pub fn root(&self) -> &DqmError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for DqmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<csv::Error> for DqmError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for DqmError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Report(err.to_string())
    }
}

/// Adds a note to the error of a `Result`.
///
/// ```rust
/// use dqm_guard::error::{DqmError, ErrorContext, Result};
///
/// fn parse(text: &str) -> Result<Vec<dqm_guard::core::Row>> {
///     serde_json::from_str(text).context("Invalid rule table")
/// }
///
/// let err = parse("[{").unwrap_err();
/// assert!(err.to_string().starts_with("Invalid rule table: Serialization error"));
/// assert!(matches!(err.root(), DqmError::Serialization(_)));
/// ```
pub trait ErrorContext<T> {
    fn context(self, context: &str) -> Result<T>;

    /// Like [`ErrorContext::context`] with a lazily built note.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<DqmError>,
{
    fn context(self, context: &str) -> Result<T> {
        self.with_context(|| context.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| DqmError::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_data_source_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err = DqmError::data_source_with_source("CSV", "Could not open file", Box::new(io));
        assert_eq!(err.to_string(), "Data source error: Could not open file");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_rule_errors() {
        assert_eq!(DqmError::RuleNotFound { id: 7 }.to_string(), "Rule 7 not found");
        assert_eq!(
            DqmError::DuplicateRuleId { id: 3 }.to_string(),
            "Rule id 3 is already in use"
        );
        assert_eq!(
            DqmError::invalid_rule("Sowing 1 % Max", "empty target column").to_string(),
            "Invalid rule 'Sowing 1 % Max': empty target column"
        );
    }

    #[test]
    fn test_context_layers() {
        let inner: Result<()> = Err(DqmError::HeaderMismatch {
            message: "Header Count Mismatch".to_string(),
        });
        let err = inner
            .context("Validating collections.csv")
            .context("Loading upload")
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Loading upload: Validating collections.csv: Header mismatch: Header Count Mismatch"
        );
        assert!(matches!(err.root(), DqmError::HeaderMismatch { .. }));
        assert!(err.source().is_some());
    }
}
