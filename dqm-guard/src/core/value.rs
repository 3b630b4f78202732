//! Scalar cell values and their classification.
//!
//! Spreadsheet cells arrive as numbers, text, booleans or nothing at all.
//! Several notions of "empty" coexist and each consumer picks its own:
//!
//! - [`CellValue::is_blank`]: null, whitespace-only text, or a not-available
//!   marker (`#N/A`, `NA`). Used by rule operators and the quick scan.
//! - [`CellValue::is_profile_blank`]: null, whitespace-only text, or a lone
//!   dash. Used by the data profiler.
//! - [`CellValue::is_error_marker`]: spreadsheet error literals such as
//!   `#DIV/0!`, counted as data by the profiler.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical not-available marker.
pub const NOT_AVAILABLE: &str = "#N/A";

/// Markers treated as blank by rule operators (compared case-insensitively).
pub const BLANK_MARKERS: [&str; 2] = ["#N/A", "NA"];

/// Spreadsheet error literals counted by the profiler.
pub const ERROR_MARKERS: [&str; 4] = ["#DIV/0!", "#REF!", "#VALUE!", "#N/A"];

static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// Parses a trimmed decimal literal into a finite number.
///
/// Returns `None` for blank text and anything that is not a plain decimal or
/// scientific literal.
///
/// # Examples
///
/// ```rust
/// use dqm_guard::core::parse_number;
///
/// assert_eq!(parse_number(" 42 "), Some(42.0));
/// assert_eq!(parse_number("-1.5e2"), Some(-150.0));
/// assert_eq!(parse_number(""), None);
/// assert_eq!(parse_number("12 ha"), None);
/// ```
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !NUMERIC_PATTERN.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns true if `text` is one of the not-available markers.
pub fn is_not_available(text: &str) -> bool {
    let trimmed = text.trim();
    BLANK_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// A single cell of a row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing value
    #[default]
    Null,
    /// Boolean cell
    Bool(bool),
    /// Numeric cell
    Number(f64),
    /// Text cell, including error literals such as `#DIV/0!`
    Text(String),
}

impl CellValue {
    /// Returns true for the null variant only.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns true if the value counts as blank for rule evaluation.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(text) => text.trim().is_empty() || is_not_available(text),
            CellValue::Bool(_) | CellValue::Number(_) => false,
        }
    }

    /// Returns true if the value counts as blank for profiling (empty or `-`).
    pub fn is_profile_blank(&self) -> bool {
        let text = self.trimmed_text();
        text.is_empty() || text == "-"
    }

    /// Returns true if the value is a spreadsheet error literal.
    pub fn is_error_marker(&self) -> bool {
        match self {
            CellValue::Text(text) => {
                let trimmed = text.trim();
                ERROR_MARKERS
                    .iter()
                    .any(|marker| trimmed.eq_ignore_ascii_case(marker))
            }
            _ => false,
        }
    }

    /// Interprets the value as a finite number, if possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(text) => parse_number(text),
            _ => None,
        }
    }

    /// Interprets the value as a number, treating anything else as zero.
    pub fn as_number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Returns the string representation with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> String {
        self.to_string().trim().to_string()
    }

    /// Returns a type-aware key for distinct-value tracking.
    ///
    /// The number `1` and the text `"1"` produce different keys.
    pub fn distinct_key(&self) -> String {
        match self {
            CellValue::Null => "null".to_string(),
            CellValue::Bool(b) => format!("b:{b}"),
            CellValue::Number(n) => format!("n:{}", format_number(*n)),
            CellValue::Text(text) => format!("s:{text}"),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}
