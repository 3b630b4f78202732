//! The operator library shared by row and aggregate rules.
//!
//! Operators are identified by short lowercase ids (`gt`, `contains`,
//! `consistency`, ...). Rule tables also use the symbolic aliases
//! `<`, `>`, `<=`, `>=`, `=`, `==` and `!=`, sometimes behind a leading `'`
//! that spreadsheets use to keep them as text. [`Operator::parse`] accepts all
//! of these. Anything else becomes [`Operator::Unknown`], which always passes.

use crate::core::{parse_number, CellValue, ColumnType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A binary comparison.
///
/// # Examples
///
/// ```rust
/// use dqm_guard::constraints::Comparator;
///
/// assert_eq!(Comparator::parse(">="), Some(Comparator::Gte));
/// assert!(Comparator::Gt.compare(10.0, 5.0));
/// assert!(Comparator::Eq.compare_with_tolerance(0.1 + 0.2, 0.3, 1e-6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
    /// Equal
    Eq,
    /// Not equal
    Neq,
}

impl Comparator {
    /// All comparators in display order.
    pub const ALL: [Comparator; 6] = [
        Comparator::Gt,
        Comparator::Lt,
        Comparator::Gte,
        Comparator::Lte,
        Comparator::Eq,
        Comparator::Neq,
    ];

    /// Parses an id (`gte`) or symbolic alias (`>=`).
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_id(raw).as_str() {
            "gt" | ">" => Some(Comparator::Gt),
            "lt" | "<" => Some(Comparator::Lt),
            "gte" | ">=" => Some(Comparator::Gte),
            "lte" | "<=" => Some(Comparator::Lte),
            "eq" | "=" | "==" => Some(Comparator::Eq),
            "neq" | "!=" => Some(Comparator::Neq),
            _ => None,
        }
    }

    /// Canonical id.
    pub fn id(&self) -> &'static str {
        match self {
            Comparator::Gt => "gt",
            Comparator::Lt => "lt",
            Comparator::Gte => "gte",
            Comparator::Lte => "lte",
            Comparator::Eq => "eq",
            Comparator::Neq => "neq",
        }
    }

    /// Mathematical symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
            Comparator::Eq => "=",
            Comparator::Neq => "!=",
        }
    }

    /// Exact numeric comparison, used for row-level values.
    pub fn compare(&self, a: f64, b: f64) -> bool {
        match self {
            Comparator::Gt => a > b,
            Comparator::Lt => a < b,
            Comparator::Gte => a >= b,
            Comparator::Lte => a <= b,
            Comparator::Eq => a == b,
            Comparator::Neq => a != b,
        }
    }

    /// Tolerant numeric comparison, used for aggregates.
    ///
    /// Strict inequalities must clear `epsilon`; inclusive ones and equality
    /// accept values within `epsilon` of the boundary.
    pub fn compare_with_tolerance(&self, a: f64, b: f64, epsilon: f64) -> bool {
        match self {
            Comparator::Gt => a > b + epsilon,
            Comparator::Lt => a < b - epsilon,
            Comparator::Gte => a >= b - epsilon,
            Comparator::Lte => a <= b + epsilon,
            Comparator::Eq => (a - b).abs() < epsilon,
            Comparator::Neq => (a - b).abs() >= epsilon,
        }
    }

    /// Applies the comparator to an ordering of the left side against the right.
    pub fn matches_ordering(&self, ordering: Ordering) -> bool {
        match self {
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Gte => ordering != Ordering::Less,
            Comparator::Lte => ordering != Ordering::Greater,
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Neq => ordering != Ordering::Equal,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A row-level operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// Numeric or string comparison, depending on the column type
    Compare(Comparator),
    /// Case-insensitive substring match
    Contains,
    /// Negated [`Operator::Contains`]
    NotContains,
    /// Case-insensitive prefix match
    StartsWith,
    /// Value is blank
    IsBlank,
    /// Value is not blank
    NotBlank,
    /// Number within the inclusive bounds of a `min,max` operand
    Between,
    /// Nonzero indicator iff the companion value is present
    Consistency,
    /// Unrecognised id; always passes
    Unknown(String),
}

impl Operator {
    /// Parses an operator id or alias.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dqm_guard::constraints::{Comparator, Operator};
    ///
    /// assert_eq!(Operator::parse("'<="), Operator::Compare(Comparator::Lte));
    /// assert_eq!(Operator::parse("starts_with"), Operator::StartsWith);
    /// assert_eq!(Operator::parse("Between"), Operator::Between);
    /// assert!(!Operator::parse("matches").is_known());
    /// ```
    pub fn parse(raw: &str) -> Self {
        if let Some(comparator) = Comparator::parse(raw) {
            return Operator::Compare(comparator);
        }
        match normalize_id(raw).as_str() {
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "starts_with" => Operator::StartsWith,
            "is_blank" => Operator::IsBlank,
            "not_blank" => Operator::NotBlank,
            "between" => Operator::Between,
            "consistency" => Operator::Consistency,
            _ => Operator::Unknown(raw.trim().to_string()),
        }
    }

    /// Canonical id (the raw text for unknown operators).
    pub fn id(&self) -> &str {
        match self {
            Operator::Compare(comparator) => comparator.id(),
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::IsBlank => "is_blank",
            Operator::NotBlank => "not_blank",
            Operator::Between => "between",
            Operator::Consistency => "consistency",
            Operator::Unknown(raw) => raw,
        }
    }

    /// Returns false for [`Operator::Unknown`].
    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Unknown(_))
    }

    /// Returns true for operators that ignore their operand.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsBlank | Operator::NotBlank)
    }

    /// Evaluates the operator on a resolved value and operand.
    ///
    /// `value_type` selects numeric or string semantics for comparisons.
    /// Blank values fail every operator except the blank checks and
    /// `consistency`. Comparisons on numeric columns fail when either side
    /// is not a number.
    pub fn evaluate(&self, value: &CellValue, operand: &CellValue, value_type: ColumnType) -> bool {
        match self {
            Operator::IsBlank => value.is_blank(),
            Operator::NotBlank => !value.is_blank(),
            Operator::Consistency => consistency(value, operand),
            Operator::Unknown(_) => true,
            _ if value.is_blank() => false,
            Operator::Contains => lowercase(value).contains(&lowercase(operand)),
            Operator::NotContains => !lowercase(value).contains(&lowercase(operand)),
            Operator::StartsWith => lowercase(value).starts_with(&lowercase(operand)),
            Operator::Between => between(value, operand),
            Operator::Compare(comparator) => match value_type {
                ColumnType::Number => match (value.as_number(), operand.as_number()) {
                    (Some(a), Some(b)) => comparator.compare(a, b),
                    _ => false,
                },
                ColumnType::String => {
                    comparator.matches_ordering(lowercase(value).cmp(&lowercase(operand)))
                }
            },
        }
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        Operator::parse(&raw)
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        Operator::parse(raw)
    }
}

impl From<Comparator> for Operator {
    fn from(comparator: Comparator) -> Self {
        Operator::Compare(comparator)
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.id().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The paired-field invariant: a nonzero indicator needs a companion value,
/// a zero indicator needs a blank companion.
fn consistency(indicator: &CellValue, companion: &CellValue) -> bool {
    let companion_blank = companion.is_blank() || companion.trimmed_text().eq_ignore_ascii_case("nan");
    if indicator.as_number_or_zero() != 0.0 {
        !companion_blank
    } else {
        companion_blank
    }
}

/// Inclusive range check; fails when the value or either bound is not a number.
fn between(value: &CellValue, bounds: &CellValue) -> bool {
    let bounds = bounds.to_string();
    let Some((min, max)) = bounds.split_once(',') else {
        return false;
    };
    match (value.as_number(), parse_number(min), parse_number(max)) {
        (Some(n), Some(min), Some(max)) => min <= n && n <= max,
        _ => false,
    }
}

fn lowercase(value: &CellValue) -> String {
    value.to_string().to_lowercase()
}

/// Trims, strips a leading spreadsheet text escape and lowercases an id.
pub(crate) fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('\'')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

/// An operator offered for a column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    /// Operator id as stored in rules
    pub id: String,
    /// Display label
    pub label: String,
}

impl OperatorInfo {
    fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Operators offered for a column of the given type.
///
/// Aggregate operators exist for numeric columns only.
pub fn operators_for(column_type: ColumnType, aggregate: bool) -> Vec<OperatorInfo> {
    if aggregate {
        return match column_type {
            ColumnType::Number => aggregate_operators(),
            ColumnType::String => Vec::new(),
        };
    }

    match column_type {
        ColumnType::Number => vec![
            OperatorInfo::new("gt", ">"),
            OperatorInfo::new("lt", "<"),
            OperatorInfo::new("gte", ">="),
            OperatorInfo::new("lte", "<="),
            OperatorInfo::new("eq", "="),
            OperatorInfo::new("neq", "!="),
            OperatorInfo::new("between", "Between (min,max)"),
            OperatorInfo::new("consistency", "Consistency (0 ↔ Blank)"),
        ],
        ColumnType::String => vec![
            OperatorInfo::new("eq", "Equals"),
            OperatorInfo::new("neq", "Not Equals"),
            OperatorInfo::new("contains", "Contains"),
            OperatorInfo::new("not_contains", "Does Not Contain"),
            OperatorInfo::new("starts_with", "Starts With"),
            OperatorInfo::new("is_blank", "Is Blank"),
            OperatorInfo::new("not_blank", "Is Not Blank"),
        ],
    }
}

fn aggregate_operators() -> Vec<OperatorInfo> {
    use crate::constraints::AggregationKind::{Avg, Max, Min, Sum};
    use Comparator::{Eq, Gt, Gte, Lt, Lte, Neq};

    let offered = [
        (Sum, vec![Gt, Lt, Gte, Lte, Eq, Neq]),
        (Avg, vec![Gt, Lt, Gte, Lte]),
        (Min, vec![Gt, Lt]),
        (Max, vec![Gt, Lt]),
    ];

    offered
        .into_iter()
        .flat_map(|(kind, comparators)| {
            comparators.into_iter().map(move |comparator| {
                OperatorInfo::new(
                    format!("{}_{}", kind.id(), comparator.id()),
                    format!("{} {}", kind.label(), comparator.symbol()),
                )
            })
        })
        .collect()
}
