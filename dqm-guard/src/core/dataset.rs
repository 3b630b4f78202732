//! Rows, columns and datasets.
//!
//! A [`Dataset`] is an ordered sequence of [`Row`]s plus a parallel list of
//! [`Column`] descriptors. Rows keep their fields in the order they were read
//! so that the full-row signature used for duplicate detection is
//! order-sensitive, like the spreadsheet it came from.

use crate::analyzers::inference::{ColumnTypeInference, InferenceConfig};
use crate::core::value::CellValue;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Declared type of a column, inferred once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Numeric column
    Number,
    /// Text column (the fallback)
    #[default]
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Number => write!(f, "number"),
            ColumnType::String => write!(f, "string"),
        }
    }
}

/// A column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column header
    pub name: String,
    /// Inferred column type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A single record: an ordered mapping from column name to cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(name, value)` pairs, keeping their order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dqm_guard::core::{CellValue, Row};
    ///
    /// let row = Row::from_pairs([("RID", CellValue::from("R1")), ("Area", CellValue::from(12.5))]);
    /// assert_eq!(row.get("Area"), Some(&CellValue::from(12.5)));
    /// assert!(row.get("Missing").is_none());
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Self::new();
        for (name, value) in pairs {
            row.insert(name, value);
        }
        row
    }

    /// Sets a cell, replacing an existing value in place or appending a new field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<CellValue>) {
        let name = name.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((name, value)),
        }
    }

    /// Builder-style variant of [`Row::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the cell for `name`, if the row has that field.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns true if the row has a field called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the fields in their original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Field names in their original order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Full-row content signature.
    ///
    /// Two rows share a signature iff they have the same fields, in the same
    /// order, with structurally equal values (`1` and `"1"` differ).
    pub fn signature(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            self.cells
                .iter()
                .map(|(name, value)| format!("{name}={}", value.distinct_key()))
                .collect::<Vec<_>>()
                .join("\u{1f}")
        })
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RowVisitor;

        impl<'de> serde::de::Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to cell values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Row, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut row = Row::new();
                while let Some((name, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row::from_pairs(iter)
    }
}

/// How strictly [`Dataset::validate_headers`] compares headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Same count, same order, case-sensitive names
    #[default]
    Strict,
    /// Every expected header must be present somewhere
    Flexible,
}

/// A single header that does not match the expected layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMismatch {
    /// 1-based position of the header
    pub position: usize,
    /// Header expected at that position
    pub expected: String,
    /// Header actually found, if any
    pub found: Option<String>,
}

/// Outcome of a header check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderValidation {
    /// Whether the headers satisfied the check
    pub valid: bool,
    /// Human-readable explanation when invalid
    pub reason: Option<String>,
    /// All mismatches found
    pub mismatches: Vec<HeaderMismatch>,
}

impl HeaderValidation {
    fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
            mismatches: Vec::new(),
        }
    }

    /// Converts an invalid outcome into an error.
    pub fn into_result(self) -> crate::error::Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(crate::error::DqmError::HeaderMismatch {
                message: self.reason.unwrap_or_default(),
            })
        }
    }
}

const MAX_LISTED_MISMATCHES: usize = 5;

/// An in-memory dataset: ordered rows plus column descriptors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Creates a dataset with explicit column descriptors.
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Creates a dataset, inferring columns and their types from the rows.
    ///
    /// Column order is the order in which headers first appear.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::from_rows_with_config(rows, &InferenceConfig::default())
    }

    /// Like [`Dataset::from_rows`] with a custom inference configuration.
    pub fn from_rows_with_config(rows: Vec<Row>, config: &InferenceConfig) -> Self {
        let mut names: Vec<String> = Vec::new();
        for row in &rows {
            for name in row.column_names() {
                if !names.iter().any(|existing| existing == name) {
                    names.push(name.to_string());
                }
            }
        }

        let inference = ColumnTypeInference::new(config.clone());
        let columns = names
            .into_iter()
            .map(|name| {
                let column_type = inference.infer(&rows, &name);
                Column::new(name, column_type)
            })
            .collect();

        Self { columns, rows }
    }

    /// Column descriptors in header order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column descriptor by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if the dataset declares a column called `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks the dataset headers against an expected layout.
    pub fn validate_headers(&self, expected: &[&str], mode: HeaderMode) -> HeaderValidation {
        let actual = self.column_names();
        match mode {
            HeaderMode::Strict => validate_strict(expected, &actual),
            HeaderMode::Flexible => validate_flexible(expected, &actual),
        }
    }
}

fn validate_strict(expected: &[&str], actual: &[&str]) -> HeaderValidation {
    if expected.len() != actual.len() {
        return HeaderValidation {
            valid: false,
            reason: Some(format!(
                "Header Count Mismatch: Expected {} columns, found {}.",
                expected.len(),
                actual.len()
            )),
            mismatches: Vec::new(),
        };
    }

    let mismatches: Vec<HeaderMismatch> = expected
        .iter()
        .zip(actual)
        .enumerate()
        .filter(|(_, (want, got))| want != got)
        .map(|(i, (want, got))| HeaderMismatch {
            position: i + 1,
            expected: want.to_string(),
            found: Some(got.to_string()),
        })
        .collect();

    if mismatches.is_empty() {
        return HeaderValidation::valid();
    }

    HeaderValidation {
        valid: false,
        reason: Some(describe_mismatches(&mismatches)),
        mismatches,
    }
}

fn validate_flexible(expected: &[&str], actual: &[&str]) -> HeaderValidation {
    let mismatches: Vec<HeaderMismatch> = expected
        .iter()
        .enumerate()
        .filter(|(_, want)| !actual.contains(*want))
        .map(|(i, want)| HeaderMismatch {
            position: i + 1,
            expected: want.to_string(),
            found: None,
        })
        .collect();

    if mismatches.is_empty() {
        return HeaderValidation::valid();
    }

    HeaderValidation {
        valid: false,
        reason: Some(describe_mismatches(&mismatches)),
        mismatches,
    }
}

fn describe_mismatches(mismatches: &[HeaderMismatch]) -> String {
    let mut lines: Vec<String> = mismatches
        .iter()
        .take(MAX_LISTED_MISMATCHES)
        .map(|m| match &m.found {
            Some(found) => format!(
                "  • Column {}: Expected \"{}\", found \"{}\"",
                m.position, m.expected, found
            ),
            None => format!("  • Column {}: \"{}\" is missing", m.position, m.expected),
        })
        .collect();

    if mismatches.len() > MAX_LISTED_MISMATCHES {
        lines.push(format!(
            "  ... and {} more mismatches",
            mismatches.len() - MAX_LISTED_MISMATCHES
        ));
    }

    format!("Column name mismatch detected:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        Row::from_pairs(pairs.iter().cloned())
    }

    #[test]
    fn test_row_insert_keeps_order() {
        let mut r = Row::new().with("b", 1).with("a", 2);
        r.insert("b", 3);
        let names: Vec<&str> = r.column_names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(r.get("b"), Some(&CellValue::from(3)));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_signature_is_structural_and_order_sensitive() {
        let a = row(&[("x", 1.into()), ("y", "k".into())]);
        let b = row(&[("x", 1.into()), ("y", "k".into())]);
        let swapped = row(&[("y", "k".into()), ("x", 1.into())]);
        let text_one = row(&[("x", "1".into()), ("y", "k".into())]);

        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), swapped.signature());
        assert_ne!(a.signature(), text_one.signature());
    }

    #[test]
    fn test_row_serde_round_trip_keeps_order() {
        let r = row(&[("z", 1.into()), ("a", CellValue::Null)]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"z":1.0,"a":null}"#);
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_from_rows_collects_headers_in_first_seen_order() {
        let ds = Dataset::from_rows(vec![
            row(&[("id", 1.into()), ("name", "a".into())]),
            row(&[("id", 2.into()), ("extra", "x".into())]),
        ]);
        assert_eq!(ds.column_names(), vec!["id", "name", "extra"]);
        assert_eq!(ds.column("id").unwrap().column_type, ColumnType::Number);
        assert_eq!(ds.column("name").unwrap().column_type, ColumnType::String);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_strict_header_validation() {
        let ds = Dataset::from_rows(vec![row(&[
            ("RID", 1.into()),
            ("State", "KA".into()),
            ("Village", "V".into()),
        ])]);

        assert!(
            ds.validate_headers(&["RID", "State", "Village"], HeaderMode::Strict)
                .valid
        );

        let wrong_order = ds.validate_headers(&["State", "RID", "Village"], HeaderMode::Strict);
        assert!(!wrong_order.valid);
        assert_eq!(wrong_order.mismatches.len(), 2);
        assert!(wrong_order
            .reason
            .as_ref()
            .unwrap()
            .contains("Column 1: Expected \"State\", found \"RID\""));

        let wrong_count = ds.validate_headers(&["RID", "State"], HeaderMode::Strict);
        assert_eq!(
            wrong_count.reason.as_deref(),
            Some("Header Count Mismatch: Expected 2 columns, found 3.")
        );
        assert!(wrong_count.into_result().is_err());
    }

    #[test]
    fn test_strict_header_validation_truncates_listing() {
        let names: Vec<String> = (0..8).map(|i| format!("c{i}")).collect();
        let ds = Dataset::from_rows(vec![Row::from_pairs(
            names.iter().map(|n| (n.clone(), CellValue::from(1))),
        )]);
        let expected: Vec<String> = (0..8).map(|i| format!("C{i}")).collect();
        let expected: Vec<&str> = expected.iter().map(String::as_str).collect();

        let result = ds.validate_headers(&expected, HeaderMode::Strict);
        assert_eq!(result.mismatches.len(), 8);
        assert!(result
            .reason
            .unwrap()
            .ends_with("  ... and 3 more mismatches"));
    }

    #[test]
    fn test_flexible_header_validation() {
        let ds = Dataset::from_rows(vec![row(&[("b", 1.into()), ("a", 2.into())])]);
        assert!(ds.validate_headers(&["a", "b"], HeaderMode::Flexible).valid);

        let missing = ds.validate_headers(&["a", "c"], HeaderMode::Flexible);
        assert!(!missing.valid);
        assert_eq!(missing.mismatches[0].expected, "c");
        assert!(missing.mismatches[0].found.is_none());
    }
}
