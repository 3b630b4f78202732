//! The aggregation calculator.
//!
//! Reduces one column, or several comma-joined columns, over a set of rows.
//! Values that do not parse as numbers are dropped rather than counted as zero.
//!
//! With a group-by column, the rows are first collapsed to the first row of
//! each group. This is how entity-level totals (values repeated on every row
//! of an entity) are added up without double counting.

use crate::core::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A reduction over a list of numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    /// Arithmetic sum
    #[default]
    Sum,
    /// Arithmetic mean
    Avg,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Number of numeric values
    Count,
}

impl AggregationKind {
    /// Parses a kind case-insensitively (`Sum`, `avg`, `AVERAGE`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sum" => Some(AggregationKind::Sum),
            "avg" | "average" | "mean" => Some(AggregationKind::Avg),
            "min" => Some(AggregationKind::Min),
            "max" => Some(AggregationKind::Max),
            "count" => Some(AggregationKind::Count),
            _ => None,
        }
    }

    /// Lowercase id used in operator ids such as `sum_gt`.
    pub fn id(&self) -> &'static str {
        match self {
            AggregationKind::Sum => "sum",
            AggregationKind::Avg => "avg",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Count => "count",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            AggregationKind::Sum => "Sum",
            AggregationKind::Avg => "Average",
            AggregationKind::Min => "Min",
            AggregationKind::Max => "Max",
            AggregationKind::Count => "Count",
        }
    }

    /// Reduces one non-empty value list.
    fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            AggregationKind::Sum => values.iter().sum(),
            AggregationKind::Avg => values.iter().sum::<f64>() / values.len() as f64,
            AggregationKind::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregationKind::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregationKind::Count => values.len() as f64,
        }
    }

    /// Combines per-column results into one.
    fn combine(&self, acc: f64, next: f64) -> f64 {
        match self {
            AggregationKind::Sum | AggregationKind::Avg | AggregationKind::Count => acc + next,
            AggregationKind::Min => acc.min(next),
            AggregationKind::Max => acc.max(next),
        }
    }

    /// Result for an empty input: 0 for sum and count, no data otherwise.
    fn empty_result(&self) -> Option<f64> {
        match self {
            AggregationKind::Sum | AggregationKind::Count => Some(0.0),
            AggregationKind::Avg | AggregationKind::Min | AggregationKind::Max => None,
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of an aggregation together with how many values fed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Reduced value; `None` means no data
    pub value: Option<f64>,
    /// Numeric values that took part, across all columns
    pub value_count: usize,
}

impl Aggregate {
    /// True when no numeric value took part.
    pub fn is_empty(&self) -> bool {
        self.value_count == 0
    }
}

/// Splits a comma-joined column spec into trimmed, non-empty names.
pub fn split_columns(column_spec: &str) -> Vec<&str> {
    column_spec
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Collapses `rows` to the first row of each `group_by` value.
///
/// Grouping only applies when the first row has the group-by column;
/// otherwise every row is returned.
pub fn representative_rows<'a>(rows: &[&'a Row], group_by: &str) -> Vec<&'a Row> {
    let grouped = rows.first().is_some_and(|row| row.contains(group_by));
    if !grouped {
        return rows.to_vec();
    }

    let mut seen = HashSet::new();
    rows.iter()
        .copied()
        .filter(|row| {
            let key = row.get(group_by).map(ToString::to_string).unwrap_or_default();
            seen.insert(key)
        })
        .collect()
}

/// Aggregates `column_spec` over `rows`, reporting how many values took part.
///
/// See [`aggregate`] for the semantics.
pub fn aggregate_detailed(
    rows: &[Row],
    column_spec: &str,
    kind: AggregationKind,
    group_by: Option<&str>,
    distinct: bool,
) -> Aggregate {
    let refs: Vec<&Row> = rows.iter().collect();
    aggregate_rows(&refs, column_spec, kind, group_by, distinct)
}

/// Like [`aggregate_detailed`] over borrowed rows, such as one group of a dataset.
pub fn aggregate_rows(
    rows: &[&Row],
    column_spec: &str,
    kind: AggregationKind,
    group_by: Option<&str>,
    distinct: bool,
) -> Aggregate {
    let input: Vec<&Row> = match group_by {
        Some(column) => representative_rows(rows, column),
        None => rows.to_vec(),
    };

    let mut value: Option<f64> = None;
    let mut value_count = 0;

    for column in split_columns(column_spec) {
        let mut values: Vec<f64> = input
            .iter()
            .filter_map(|row| row.get(column).and_then(|cell| cell.as_number()))
            .collect();

        if values.is_empty() {
            continue;
        }

        if distinct && group_by.is_none() {
            let mut seen = HashSet::new();
            values.retain(|v| seen.insert((v + 0.0).to_bits()));
        }

        value_count += values.len();
        let reduced = kind.reduce(&values);
        value = Some(match value {
            Some(acc) => kind.combine(acc, reduced),
            None => reduced,
        });
    }

    Aggregate {
        value: value.or_else(|| kind.empty_result()),
        value_count,
    }
}

/// Aggregates `column_spec` over `rows`.
///
/// - Comma-joined columns are reduced one by one and then combined: sums,
///   averages and counts add up, minimums take the smallest, maximums the
///   largest.
/// - With `group_by`, only the first row of each group is used.
/// - With `distinct` and no `group_by`, each column's values are
///   deduplicated before reduction.
/// - An empty input yields `Some(0.0)` for sum and count, and `None`
///   ("no data") for avg, min and max.
///
/// # Examples
///
/// ```rust
/// use dqm_guard::constraints::{aggregate, AggregationKind};
/// use dqm_guard::core::Row;
///
/// let rows = vec![
///     Row::new().with("RID", "R1").with("Agri", 40).with("Crop", 10),
///     Row::new().with("RID", "R1").with("Agri", 40).with("Crop", 15),
///     Row::new().with("RID", "R2").with("Agri", 25).with("Crop", 20),
/// ];
///
/// assert_eq!(aggregate(&rows, "Crop", AggregationKind::Sum, None, false), Some(45.0));
/// assert_eq!(aggregate(&rows, "Agri", AggregationKind::Sum, Some("RID"), false), Some(65.0));
/// assert_eq!(aggregate(&[], "Crop", AggregationKind::Min, None, false), None);
/// ```
pub fn aggregate(
    rows: &[Row],
    column_spec: &str,
    kind: AggregationKind,
    group_by: Option<&str>,
    distinct: bool,
) -> Option<f64> {
    aggregate_detailed(rows, column_spec, kind, group_by, distinct).value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CellValue;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("value", 10).with("target", 5),
            Row::new().with("value", 20).with("target", 25),
            Row::new().with("value", 30).with("target", 15),
            Row::new().with("value", 40).with("target", 45),
        ]
    }

    #[test]
    fn test_basic_reductions() {
        let data = rows();
        assert_eq!(aggregate(&data, "value", AggregationKind::Sum, None, false), Some(100.0));
        assert_eq!(aggregate(&data, "value", AggregationKind::Avg, None, false), Some(25.0));
        assert_eq!(aggregate(&data, "value", AggregationKind::Min, None, false), Some(10.0));
        assert_eq!(aggregate(&data, "value", AggregationKind::Max, None, false), Some(40.0));
        assert_eq!(aggregate(&data, "value", AggregationKind::Count, None, false), Some(4.0));
    }

    #[test]
    fn test_multi_column_combination() {
        let data = rows();
        assert_eq!(
            aggregate(&data, "value, target", AggregationKind::Sum, None, false),
            Some(190.0)
        );
        assert_eq!(
            aggregate(&data, "value,target", AggregationKind::Min, None, false),
            Some(5.0)
        );
        assert_eq!(
            aggregate(&data, "value,target", AggregationKind::Max, None, false),
            Some(45.0)
        );
        assert_eq!(
            aggregate(&data, "value,target", AggregationKind::Count, None, false),
            Some(8.0)
        );
    }

    #[test]
    fn test_non_numeric_values_are_excluded() {
        let data = vec![
            Row::new().with("v", 4),
            Row::new().with("v", "#DIV/0!"),
            Row::new().with("v", CellValue::Null),
            Row::new().with("v", "8"),
        ];
        assert_eq!(aggregate(&data, "v", AggregationKind::Avg, None, false), Some(6.0));
        assert_eq!(aggregate(&data, "v", AggregationKind::Count, None, false), Some(2.0));
    }

    #[test]
    fn test_empty_inputs() {
        let data = vec![Row::new().with("v", "text")];
        assert_eq!(aggregate(&data, "v", AggregationKind::Sum, None, false), Some(0.0));
        assert_eq!(aggregate(&data, "v", AggregationKind::Count, None, false), Some(0.0));
        assert_eq!(aggregate(&data, "v", AggregationKind::Avg, None, false), None);
        assert_eq!(aggregate(&data, "v", AggregationKind::Min, None, false), None);
        assert_eq!(aggregate(&data, "v", AggregationKind::Max, None, false), None);
        assert_eq!(aggregate(&data, " , ", AggregationKind::Sum, None, false), Some(0.0));

        let detailed = aggregate_detailed(&data, "v", AggregationKind::Sum, None, false);
        assert!(detailed.is_empty());
    }

    #[test]
    fn test_group_by_uses_one_row_per_group() {
        let data = vec![
            Row::new().with("RID", "R1").with("Agri", 40),
            Row::new().with("RID", "R1").with("Agri", 40),
            Row::new().with("RID", "R2").with("Agri", 25),
            Row::new().with("RID", "R2").with("Agri", 25),
            Row::new().with("RID", "R3").with("Agri", 10),
        ];
        assert_eq!(
            aggregate(&data, "Agri", AggregationKind::Sum, Some("RID"), false),
            Some(75.0)
        );
        assert_eq!(
            aggregate(&data, "Agri", AggregationKind::Sum, None, false),
            Some(140.0)
        );
        let refs: Vec<&Row> = data.iter().collect();
        assert_eq!(representative_rows(&refs, "RID").len(), 3);
    }

    #[test]
    fn test_group_by_absent_column_uses_all_rows() {
        let data = rows();
        assert_eq!(
            aggregate(&data, "value", AggregationKind::Sum, Some("RID"), false),
            Some(100.0)
        );
    }

    #[test]
    fn test_distinct_without_group_by() {
        let data = vec![
            Row::new().with("v", 5),
            Row::new().with("v", 5.0),
            Row::new().with("v", "5"),
            Row::new().with("v", 7),
        ];
        assert_eq!(aggregate(&data, "v", AggregationKind::Sum, None, true), Some(12.0));
        assert_eq!(aggregate(&data, "v", AggregationKind::Sum, None, false), Some(22.0));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(AggregationKind::parse("Sum"), Some(AggregationKind::Sum));
        assert_eq!(AggregationKind::parse(" AVERAGE "), Some(AggregationKind::Avg));
        assert_eq!(AggregationKind::parse("median"), None);
        assert_eq!(AggregationKind::Avg.label(), "Average");
    }
}
