//! Report formatting for engine runs.
//!
//! A [`DqmReport`] bundles the outputs of one run (execution result and,
//! optionally, the data profile, quick-scan findings, applied rules and the
//! dataset itself). Formatters turn it into text:
//!
//! - [`JsonFormatter`]: structured JSON for programmatic consumers
//! - [`HumanFormatter`]: console summary
//! - [`RowReportFormatter`]: the dataset as CSV with status and joined
//!   failure reasons appended to every row
//!
//! # Examples
//!
//! ```rust
//! use dqm_guard::core::{Dataset, Row};
//! use dqm_guard::engine::RuleEngine;
//! use dqm_guard::formatters::{DqmReport, FormatterConfig, HumanFormatter, ReportFormatter};
//! use dqm_guard::rules::{RowRule, Rule, RuleSet};
//!
//! # fn main() -> dqm_guard::error::Result<()> {
//! let dataset = Dataset::from_rows(vec![Row::new().with("value", -1)]);
//! let rules = RuleSet::from_rules(vec![Rule::row(1, RowRule::new("value", "gte", "0"))])?;
//! let execution = RuleEngine::default().execute(&dataset, &rules);
//!
//! let output = HumanFormatter::with_config(FormatterConfig::minimal())
//!     .format(&DqmReport::new(&execution))?;
//! assert!(output.contains("FAILED"));
//! # Ok(())
//! # }
//! ```

use crate::analyzers::{DataProfile, QuickScanFindings};
use crate::core::{Dataset, ExecutionResult, ProfiledExecution};
use crate::error::{DqmError, Result};
use crate::rules::Rule;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt::Write;

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include per-row results
    pub include_rows: bool,
    /// Include rows that passed (only failing rows otherwise)
    pub include_passing_rows: bool,
    /// Maximum number of rows to display (`None` for all)
    pub max_rows: Option<usize>,
    /// Include the data profile when present
    pub include_profile: bool,
    /// Include quick-scan findings when present
    pub include_quick_scan: bool,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the generation timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_rows: true,
            include_passing_rows: false,
            max_rows: Some(50),
            include_profile: true,
            include_quick_scan: true,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            include_rows: false,
            include_passing_rows: false,
            max_rows: Some(0),
            include_profile: false,
            include_quick_scan: false,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a detailed configuration showing everything.
    pub fn detailed() -> Self {
        Self {
            include_rows: true,
            include_passing_rows: true,
            max_rows: None,
            include_profile: true,
            include_quick_scan: true,
            use_colors: true,
            include_timestamps: true,
        }
    }

    /// Sets whether to include per-row results.
    pub fn with_rows(mut self, include: bool) -> Self {
        self.include_rows = include;
        self
    }

    /// Sets the maximum number of rows to display.
    pub fn with_max_rows(mut self, max: Option<usize>) -> Self {
        self.max_rows = max;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Sets whether to include timestamps.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }
}

/// Everything produced by one run, ready for formatting.
#[derive(Debug, Clone, Serialize)]
pub struct DqmReport<'a> {
    /// Name of the input (file name, sheet name, ...)
    pub source: Option<String>,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
    /// Rule verdicts
    pub execution: &'a ExecutionResult,
    /// Column statistics
    pub data_profile: Option<&'a DataProfile>,
    /// Quick-scan findings
    pub quick_scan: Option<&'a QuickScanFindings>,
    /// Rules that were applied
    pub rules: Option<&'a [Rule]>,
    /// The evaluated dataset, needed for row-level exports
    #[serde(skip)]
    pub dataset: Option<&'a Dataset>,
}

impl<'a> DqmReport<'a> {
    /// Creates a report around an execution result, stamped with the current time.
    pub fn new(execution: &'a ExecutionResult) -> Self {
        Self {
            source: None,
            generated_at: Utc::now(),
            execution,
            data_profile: None,
            quick_scan: None,
            rules: None,
            dataset: None,
        }
    }

    /// Creates a report from a profiling run, including its profile and rules.
    pub fn from_profiled(profiled: &'a ProfiledExecution) -> Self {
        Self {
            data_profile: Some(&profiled.data_profile),
            rules: Some(profiled.rules_applied.as_slice()),
            ..Self::new(&profiled.execution)
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn with_profile(mut self, profile: &'a DataProfile) -> Self {
        self.data_profile = Some(profile);
        self
    }

    pub fn with_quick_scan(mut self, findings: &'a QuickScanFindings) -> Self {
        self.quick_scan = Some(findings);
        self
    }

    pub fn with_rules(mut self, rules: &'a [Rule]) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_dataset(mut self, dataset: &'a Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }
}

/// Trait for turning a [`DqmReport`] into text.
///
/// ```rust
/// use dqm_guard::formatters::{DqmReport, ReportFormatter};
///
/// struct StatusOnly;
///
/// impl ReportFormatter for StatusOnly {
///     fn format(&self, report: &DqmReport<'_>) -> dqm_guard::error::Result<String> {
///         Ok(report.execution.summary.quality_score_label())
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a report.
    fn format(&self, report: &DqmReport<'_>) -> Result<String>;

    /// Formats a report with a custom configuration.
    ///
    /// The default implementation ignores the configuration.
    fn format_with_config(&self, report: &DqmReport<'_>, _config: &FormatterConfig) -> Result<String> {
        self.format(report)
    }
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &DqmReport<'_>) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &DqmReport<'_>, config: &FormatterConfig) -> Result<String> {
        let execution = report.execution;
        let mut document = Map::new();

        if let Some(source) = &report.source {
            document.insert("source".to_string(), json!(source));
        }
        if config.include_timestamps {
            document.insert("generated_at".to_string(), json!(report.generated_at.to_rfc3339()));
        }
        document.insert("passed".to_string(), json!(execution.is_clean()));
        document.insert("summary".to_string(), serde_json::to_value(&execution.summary)?);
        document.insert("global_errors".to_string(), json!(execution.global_errors));

        if config.include_rows {
            let rows: Vec<_> = selected_rows(execution, config).collect();
            document.insert("rows".to_string(), serde_json::to_value(rows)?);
        }
        if let Some(rules) = report.rules {
            document.insert("rules_applied".to_string(), serde_json::to_value(rules)?);
        }
        if let (true, Some(profile)) = (config.include_profile, report.data_profile) {
            document.insert("data_profile".to_string(), serde_json::to_value(profile)?);
        }
        if let (true, Some(findings)) = (config.include_quick_scan, report.quick_scan) {
            document.insert("quick_scan".to_string(), serde_json::to_value(findings)?);
        }

        let value = Value::Object(document);
        let text = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }
}

/// Rows selected for display, honoring the passing-row filter and row limit.
fn selected_rows<'r>(
    execution: &'r ExecutionResult,
    config: &FormatterConfig,
) -> impl Iterator<Item = &'r crate::core::EvaluationResult> {
    let include_passing = config.include_passing_rows;
    execution
        .results
        .iter()
        .filter(move |r| include_passing || !r.passed || r.is_duplicate)
        .take(config.max_rows.unwrap_or(usize::MAX))
}

/// Formats reports for console output.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &DqmReport<'_>) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &DqmReport<'_>, config: &FormatterConfig) -> Result<String> {
        let execution = report.execution;
        let summary = &execution.summary;
        let colors = config.use_colors;
        let mut output = String::new();

        writeln!(output)?;
        if execution.is_clean() {
            writeln!(output, "✅ {}", paint("Data quality check PASSED", "32", colors))?;
        } else {
            writeln!(output, "❌ {}", paint("Data quality check FAILED", "31", colors))?;
        }
        writeln!(output)?;

        if let Some(source) = &report.source {
            writeln!(output, "Source: {source}")?;
        }
        if config.include_timestamps {
            writeln!(output, "Generated: {}", report.generated_at.to_rfc3339())?;
        }

        writeln!(output)?;
        writeln!(output, "📊 Summary:")?;
        writeln!(output, "   Rows: {}", summary.total)?;
        writeln!(output, "   ✅ Passed: {}", paint(&summary.passed.to_string(), "32", colors))?;
        writeln!(output, "   ❌ Failed: {}", paint(&summary.failed.to_string(), "31", colors))?;
        writeln!(output, "   Pass Rate: {}%", summary.pass_percentage_label())?;
        writeln!(output, "   Quality Score: {}/10", summary.quality_score_label())?;
        writeln!(output, "   Duplicate Rows: {}", execution.duplicates().count())?;

        if !execution.global_errors.is_empty() {
            writeln!(output)?;
            writeln!(output, "🌐 Aggregate Failures:")?;
            for error in &execution.global_errors {
                writeln!(output, "   {error}")?;
            }
        }

        if config.include_rows {
            let shown: Vec<_> = selected_rows(execution, config).collect();
            if !shown.is_empty() {
                writeln!(output)?;
                writeln!(output, "🔍 Rows:")?;
                for result in &shown {
                    write!(output, "   Row {}: {}", result.row_index, result.status_label())?;
                    if !result.passed {
                        write!(output, " - {}", result.joined_reasons("; "))?;
                    }
                    if let Some(first) = result.duplicate_of {
                        write!(output, " (duplicate of row {first})")?;
                    }
                    writeln!(output)?;
                }

                let eligible = execution
                    .results
                    .iter()
                    .filter(|r| config.include_passing_rows || !r.passed || r.is_duplicate)
                    .count();
                if eligible > shown.len() {
                    writeln!(output, "   ... and {} more rows", eligible - shown.len())?;
                }
            }
        }

        if let (true, Some(findings)) = (config.include_quick_scan, report.quick_scan) {
            writeln!(output)?;
            writeln!(output, "🧪 Quick Scan:")?;
            for column in &findings.columns {
                write!(
                    output,
                    "   {}: {} nulls ({:.2}%), {} unique ({:.2}%)",
                    column.name,
                    column.null_count,
                    column.null_rate * 100.0,
                    column.unique_count,
                    column.uniqueness_ratio * 100.0,
                )?;
                if column.is_primary_key_candidate {
                    write!(output, ", primary key candidate")?;
                }
                writeln!(output)?;
            }
        }

        if let (true, Some(profile)) = (config.include_profile, report.data_profile) {
            writeln!(output)?;
            writeln!(output, "📋 Data Profile:")?;
            for column in &profile.columns {
                writeln!(
                    output,
                    "   {}: {} blank, {} errors, {} zero, {} unique",
                    column.name,
                    column.blank_count,
                    column.error_marker_count,
                    column.zero_count,
                    column.unique_value_count,
                )?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Column holding `PASS` / `FAIL` in row exports.
pub const STATUS_COLUMN: &str = "_QC_STATUS";
/// Column holding the joined failure reasons in row exports.
pub const FAILURE_COLUMN: &str = "_FAILURE_MESSAGE";
/// Column holding the first occurrence of a duplicate row in row exports.
pub const DUPLICATE_COLUMN: &str = "_DUPLICATE_OF";

/// Exports the evaluated dataset as CSV, one line per row.
///
/// Every original column is kept and three columns are appended: the row
/// status, the failure reasons joined with the separator, and the 1-based
/// index of the first identical row for duplicates. Requires
/// [`DqmReport::with_dataset`].
#[derive(Debug, Clone)]
pub struct RowReportFormatter {
    delimiter: u8,
    separator: String,
}

impl RowReportFormatter {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            separator: "; ".to_string(),
        }
    }

    /// Sets the CSV field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the separator placed between failure reasons.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for RowReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for RowReportFormatter {
    fn format(&self, report: &DqmReport<'_>) -> Result<String> {
        let dataset = report.dataset.ok_or_else(|| {
            DqmError::Configuration("Row reports need the evaluated dataset".to_string())
        })?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        let names = dataset.column_names();
        let mut header: Vec<&str> = names.clone();
        header.extend([STATUS_COLUMN, FAILURE_COLUMN, DUPLICATE_COLUMN]);
        writer.write_record(&header)?;

        for (index, row) in dataset.rows().iter().enumerate() {
            let result = report.execution.results.get(index);
            let mut record: Vec<String> = names
                .iter()
                .map(|name| row.get(name).map(ToString::to_string).unwrap_or_default())
                .collect();
            record.push(result.map_or("N/A", |r| r.status_label()).to_string());
            record.push(
                result
                    .filter(|r| !r.passed)
                    .map(|r| r.joined_reasons(&self.separator))
                    .unwrap_or_default(),
            );
            record.push(
                result
                    .and_then(|r| r.duplicate_of)
                    .map(|first| first.to_string())
                    .unwrap_or_default(),
            );
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DqmError::Report(format!("Failed to flush row report: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| DqmError::Serialization(format!("Row report is not valid UTF-8: {e}")))
    }
}
