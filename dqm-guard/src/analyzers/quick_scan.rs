//! Single-pass dataset health scan.
//!
//! [`QuickScanner::scan`] walks the rows once and reports duplicates, null
//! rates, uniqueness and value ranges per column. The findings are raw
//! numbers; turning them into warnings (e.g. a null rate above 30%) is left
//! to the caller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::{CellValue, ColumnType, Dataset};
use crate::engine::duplicate_indices;

/// Minimum, maximum and mean of a column's numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Smallest numeric value
    pub min: f64,
    /// Largest numeric value
    pub max: f64,
    /// Mean of the numeric values, ignoring text and blanks
    pub avg: f64,
}

/// Shortest and longest text value of a column, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    /// Length of the shortest text value
    pub min_length: usize,
    /// Length of the longest text value
    pub max_length: usize,
}

/// Per-column findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetrics {
    /// Column name
    pub name: String,
    /// Distinct non-blank values
    pub unique_count: usize,
    /// `unique_count / non-blank count`, 0 when every value is blank
    pub uniqueness_ratio: f64,
    /// Blank cells, including `#N/A` / `NA` markers and absent cells
    pub null_count: usize,
    /// `null_count / total rows`, 0 for an empty dataset
    pub null_rate: f64,
    /// `Number` if numeric values outnumber text values
    pub inferred_type: ColumnType,
    /// Every row holds a distinct, non-blank value
    pub is_primary_key_candidate: bool,
    /// Present when the column has at least one numeric value
    pub numeric: Option<NumericRange>,
    /// Present when the column has at least one text value
    pub text: Option<LengthRange>,
}

/// Dataset-wide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Rows scanned
    pub total_rows: usize,
    /// Columns seen across all rows
    pub total_columns: usize,
    /// Blank cells across all columns
    pub null_count: usize,
}

/// Result of a quick scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuickScanFindings {
    /// 1-based indices of rows identical to an earlier row
    pub duplicate_row_indices: Vec<usize>,
    /// Findings per column, in column order
    pub columns: Vec<ColumnMetrics>,
    pub stats: ScanStats,
}

impl QuickScanFindings {
    /// Looks up the findings for a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnMetrics> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that could serve as a primary key.
    pub fn primary_key_candidates(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key_candidate)
            .map(|c| c.name.as_str())
    }
}

#[derive(Default)]
struct ColumnAccumulator {
    unique: HashSet<String>,
    numbers: Vec<f64>,
    text_lengths: Vec<usize>,
    nulls: usize,
}

impl ColumnAccumulator {
    fn observe(&mut self, value: &CellValue) {
        if value.is_blank() {
            self.nulls += 1;
            return;
        }
        self.unique.insert(value.distinct_key());
        match value.as_number() {
            Some(n) => self.numbers.push(n),
            None => self.text_lengths.push(value.to_string().chars().count()),
        }
    }

    fn finish(self, name: &str, total_rows: usize) -> ColumnMetrics {
        let non_blank = self.numbers.len() + self.text_lengths.len();
        let unique_count = self.unique.len();

        let numeric = (!self.numbers.is_empty()).then(|| NumericRange {
            min: self.numbers.iter().copied().fold(f64::INFINITY, f64::min),
            max: self.numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: self.numbers.iter().sum::<f64>() / self.numbers.len() as f64,
        });
        let text = match (self.text_lengths.iter().min(), self.text_lengths.iter().max()) {
            (Some(&min_length), Some(&max_length)) => Some(LengthRange {
                min_length,
                max_length,
            }),
            _ => None,
        };

        ColumnMetrics {
            name: name.to_string(),
            unique_count,
            uniqueness_ratio: ratio(unique_count, non_blank),
            null_count: self.nulls,
            null_rate: ratio(self.nulls, total_rows),
            inferred_type: if self.numbers.len() > self.text_lengths.len() {
                ColumnType::Number
            } else {
                ColumnType::String
            },
            is_primary_key_candidate: unique_count == total_rows && self.nulls == 0,
            numeric,
            text,
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Runs quick scans.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickScanner;

impl QuickScanner {
    /// Creates a scanner.
    ///
    /// ```rust
    /// use dqm_guard::analyzers::QuickScanner;
    /// use dqm_guard::core::{Dataset, Row};
    ///
    /// let dataset = Dataset::from_rows(vec![
    ///     Row::new().with("area", 4).with("crop", "Paddy"),
    ///     Row::new().with("area", 10).with("crop", ""),
    /// ]);
    /// let findings = QuickScanner::new().scan(&dataset);
    ///
    /// assert_eq!(findings.stats.total_rows, 2);
    /// assert_eq!(findings.stats.total_columns, 2);
    /// assert_eq!(findings.stats.null_count, 1);
    ///
    /// let area = findings.columns[0].numeric.unwrap();
    /// assert_eq!((area.min, area.max, area.avg), (4.0, 10.0, 7.0));
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Scans `dataset`.
    #[instrument(skip(self, dataset), fields(rows = dataset.len()))]
    pub fn scan(&self, dataset: &Dataset) -> QuickScanFindings {
        let names = dataset.column_names();
        let mut accumulators: Vec<ColumnAccumulator> =
            names.iter().map(|_| ColumnAccumulator::default()).collect();

        for row in dataset.rows() {
            for (name, accumulator) in names.iter().zip(accumulators.iter_mut()) {
                accumulator.observe(row.get(name).unwrap_or(&CellValue::Null));
            }
        }

        let total_rows = dataset.len();
        let columns: Vec<ColumnMetrics> = names
            .iter()
            .zip(accumulators)
            .map(|(name, accumulator)| accumulator.finish(name, total_rows))
            .collect();

        let stats = ScanStats {
            total_rows,
            total_columns: columns.len(),
            null_count: columns.iter().map(|c| c.null_count).sum(),
        };
        let duplicate_row_indices = duplicate_indices(dataset.rows());

        debug!(
            columns = stats.total_columns,
            nulls = stats.null_count,
            duplicates = duplicate_row_indices.len(),
            "Quick scan finished"
        );

        QuickScanFindings {
            duplicate_row_indices,
            columns,
            stats,
        }
    }
}

/// Shorthand for `QuickScanner::new().scan(dataset)`.
pub fn quick_scan(dataset: &Dataset) -> QuickScanFindings {
    QuickScanner::new().scan(dataset)
}
