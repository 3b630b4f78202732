//! Operand resolution.

use crate::constraints::aggregation::split_columns;
use crate::core::{parse_number, CellValue, Row, NOT_AVAILABLE};

/// Resolves a rule operand against a row.
///
/// - A column operand naming several comma-separated columns resolves to the
///   sum of those cells, with missing or non-numeric cells counted as 0.
/// - A column operand naming one column resolves to that cell as-is, or
///   null when the row lacks it.
/// - A literal resolves to a number when it parses as one, to the canonical
///   `#N/A` marker when it is a not-available marker, and to the text
///   otherwise.
///
/// # Examples
///
/// ```rust
/// use dqm_guard::constraints::resolve;
/// use dqm_guard::core::{CellValue, Row};
///
/// let row = Row::new().with("S1", 4).with("S2", "6").with("ACR", "Paddy");
///
/// assert_eq!(resolve("S1, S2", &row, true), CellValue::from(10.0));
/// assert_eq!(resolve("ACR", &row, true), CellValue::from("Paddy"));
/// assert_eq!(resolve(" 100 ", &row, false), CellValue::from(100.0));
/// assert_eq!(resolve("#n/a", &row, false), CellValue::from("#N/A"));
/// ```
pub fn resolve(operand: &str, row: &Row, is_column: bool) -> CellValue {
    if is_column {
        let columns = split_columns(operand);
        if columns.len() > 1 {
            let total: f64 = columns
                .iter()
                .map(|column| row.get(column).map_or(0.0, CellValue::as_number_or_zero))
                .sum();
            return CellValue::Number(total);
        }
        let column = columns.first().copied().unwrap_or(operand);
        return row.get(column).cloned().unwrap_or(CellValue::Null);
    }

    if let Some(number) = parse_number(operand) {
        return CellValue::Number(number);
    }
    if operand.trim().eq_ignore_ascii_case(NOT_AVAILABLE) {
        return CellValue::from(NOT_AVAILABLE);
    }
    CellValue::from(operand)
}

/// The first of the comma-separated `columns` whose cell is a nonzero
/// number, in listed order. Absent or non-numeric cells count as 0, and so
/// does the result when every cell does.
///
/// ```rust
/// use dqm_guard::constraints::resolve_first_non_zero;
/// use dqm_guard::core::{CellValue, Row};
///
/// let row = Row::new().with("S3", 0).with("S2", "").with("S1", 45);
/// assert_eq!(resolve_first_non_zero("S3,S2,S1", &row), CellValue::from(45.0));
/// ```
pub fn resolve_first_non_zero(columns: &str, row: &Row) -> CellValue {
    let latest = split_columns(columns)
        .into_iter()
        .map(|column| row.get(column).map_or(0.0, CellValue::as_number_or_zero))
        .find(|value| *value != 0.0)
        .unwrap_or(0.0);
    CellValue::Number(latest)
}
