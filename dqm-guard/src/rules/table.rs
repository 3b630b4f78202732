//! Import of rules from a structured rule table.
//!
//! A rule table is a sheet with one rule per row and these headers:
//!
//! | Header | Meaning |
//! |---|---|
//! | `QC_Check_Name` | rule name (default `Rule <n>`) |
//! | `Level` | `Row` (default), `Agg` or `Aggregate` |
//! | `Target_Column` | target column, comma-joined for sums |
//! | `Condition` | operator id or alias (`gte`, `'>=`, ...) |
//! | `Compare_Against` | literal or column name(s) |
//! | `Is_Compare_Column` | `true`/`yes` when `Compare_Against` names columns |
//! | `Aggregation` | reduction for aggregate rules (default `Sum`) |
//! | `Group_By` | group-by column for aggregate rules |
//! | `Distinct` | `true`/`yes` to deduplicate values |
//!
//! Imported rules get ids starting at [`TABLE_RULE_ID_BASE`], in table order.
//! Imported aggregate rules with a group-by column take one representative
//! row per group and produce a single verdict.

use crate::constraints::{AggregationKind, Comparator};
use crate::core::{Dataset, Row};
use crate::error::{DqmError, Result};
use crate::rules::{AggregateOperator, AggregateRule, GroupMode, RowRule, Rule, RuleSet};
use tracing::{debug, instrument, warn};

/// Id of the first imported rule.
pub const TABLE_RULE_ID_BASE: u64 = 500;

const NAME: &str = "QC_Check_Name";
const LEVEL: &str = "Level";
const TARGET: &str = "Target_Column";
const CONDITION: &str = "Condition";
const COMPARE: &str = "Compare_Against";
const IS_COMPARE_COLUMN: &str = "Is_Compare_Column";
const AGGREGATION: &str = "Aggregation";
const GROUP_BY: &str = "Group_By";
const DISTINCT: &str = "Distinct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Row,
    Aggregate,
}

/// Converts rule-table rows into a [`RuleSet`].
///
/// In lenient mode (the default) rows with an unknown level, an empty target
/// column or an unknown aggregation are skipped with a warning. In strict
/// mode they are errors.
///
/// # Examples
///
/// ```rust
/// use dqm_guard::core::Row;
/// use dqm_guard::rules::table::RuleTableImporter;
///
/// # fn main() -> dqm_guard::error::Result<()> {
/// let table = vec![Row::new()
///     .with("QC_Check_Name", "Sowing 1 % Max")
///     .with("Level", "Row")
///     .with("Target_Column", "Sowing 1 Percentage")
///     .with("Condition", "'<=")
///     .with("Compare_Against", "100")];
///
/// let rules = RuleTableImporter::new().import(&table)?;
/// assert_eq!(rules.as_slice()[0].id, 500);
/// assert_eq!(rules.as_slice()[0].description(), "Sowing 1 Percentage lte 100");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTableImporter {
    strict: bool,
}

impl RuleTableImporter {
    /// Creates a lenient importer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Imports rules from the rows of a dataset.
    pub fn import_dataset(&self, table: &Dataset) -> Result<RuleSet> {
        self.import(table.rows())
    }

    /// Imports rules from rule-table rows.
    #[instrument(skip(self, table), fields(rows = table.len(), strict = self.strict))]
    pub fn import(&self, table: &[Row]) -> Result<RuleSet> {
        let mut rules = RuleSet::new();

        for (index, row) in table.iter().enumerate() {
            let id = TABLE_RULE_ID_BASE + index as u64;
            let name = text(row, NAME).unwrap_or_else(|| format!("Rule {}", index + 1));

            match self.convert(id, &name, row) {
                Ok(rule) => rules.add(rule)?,
                Err(err) if !self.strict => {
                    warn!(rule_id = id, rule = %name, error = %err, "Skipping rule table row");
                }
                Err(err) => return Err(err),
            }
        }

        debug!(imported = rules.len(), "Imported rule table");
        Ok(rules)
    }

    fn convert(&self, id: u64, name: &str, row: &Row) -> Result<Rule> {
        let level = parse_level(row).ok_or_else(|| {
            DqmError::invalid_rule(
                name,
                format!(
                    "unrecognised level '{}'",
                    text(row, LEVEL).unwrap_or_default()
                ),
            )
        })?;

        let target = text(row, TARGET)
            .ok_or_else(|| DqmError::invalid_rule(name, "empty target column"))?;
        let condition = text(row, CONDITION).unwrap_or_default();
        let operand = text(row, COMPARE).unwrap_or_default();
        let operand_is_column = flag(row, IS_COMPARE_COLUMN);

        let rule = match level {
            Level::Row => {
                let mut body = RowRule::new(target, condition.as_str(), operand);
                body.operand_is_column = operand_is_column;
                Rule::row(id, body)
            }
            Level::Aggregate => {
                let kind_text = text(row, AGGREGATION).unwrap_or_else(|| "Sum".to_string());
                let kind = AggregationKind::parse(&kind_text).ok_or_else(|| {
                    DqmError::invalid_rule(name, format!("unrecognised aggregation '{kind_text}'"))
                })?;
                let operator = match Comparator::parse(&condition) {
                    Some(comparator) => AggregateOperator::new(kind, comparator),
                    None => AggregateOperator::Unknown(condition),
                };

                let mut body = AggregateRule::new(target, operator, operand).with_ref_agg(kind);
                body.operand_is_column = operand_is_column;
                body.distinct_per_group = flag(row, DISTINCT);
                if let Some(group_by) = text(row, GROUP_BY) {
                    body = body
                        .grouped_by(group_by)
                        .with_group_mode(GroupMode::Representative);
                }
                Rule::aggregate(id, body)
            }
        };

        Ok(rule.with_name(name))
    }
}

/// Imports a rule table leniently.
pub fn parse_rule_table(table: &[Row]) -> Result<RuleSet> {
    RuleTableImporter::new().import(table)
}

fn text(row: &Row, field: &str) -> Option<String> {
    row.get(field)
        .map(|value| value.trimmed_text())
        .filter(|value| !value.is_empty())
}

fn flag(row: &Row, field: &str) -> bool {
    text(row, field).is_some_and(|value| {
        value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
    })
}

fn parse_level(row: &Row) -> Option<Level> {
    match text(row, LEVEL)
        .unwrap_or_else(|| "row".to_string())
        .to_lowercase()
        .as_str()
    {
        "row" => Some(Level::Row),
        "agg" | "aggregate" => Some(Level::Aggregate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Operator;
    use crate::rules::RuleKind;

    fn table_row(fields: &[(&str, &str)]) -> Row {
        Row::from_pairs(fields.iter().map(|(k, v)| (*k, *v)))
    }

    #[test]
    fn test_row_rule_import() {
        let table = vec![
            table_row(&[
                (NAME, "Sowing 2 >= Sowing 1"),
                (TARGET, "Sowing2 Area (ha)"),
                (CONDITION, "'>="),
                (COMPARE, "Sowing 1 Area (ha)"),
                (IS_COMPARE_COLUMN, "Yes"),
            ]),
            table_row(&[(TARGET, "Sowing 2 ACR"), (CONDITION, "not_blank")]),
        ];

        let rules = parse_rule_table(&table).unwrap();
        assert_eq!(rules.len(), 2);

        let first = &rules.as_slice()[0];
        assert_eq!(first.id, 500);
        assert_eq!(first.name.as_deref(), Some("Sowing 2 >= Sowing 1"));
        match &first.kind {
            RuleKind::Row(rule) => {
                assert_eq!(rule.operator, Operator::Compare(Comparator::Gte));
                assert!(rule.operand_is_column);
            }
            RuleKind::Aggregate(_) => panic!("expected a row rule"),
        }

        let second = &rules.as_slice()[1];
        assert_eq!(second.id, 501);
        assert_eq!(second.display_name(), "Rule 2");
    }

    #[test]
    fn test_aggregate_rule_import() {
        let table = vec![table_row(&[
            (NAME, "Agri within Geo"),
            (LEVEL, "Agg"),
            (TARGET, "Total Agriculture Area (ha)"),
            (CONDITION, "<="),
            (COMPARE, "Total Geographical Area (ha)"),
            (IS_COMPARE_COLUMN, "true"),
            (AGGREGATION, "Sum"),
            (GROUP_BY, "RID"),
            (DISTINCT, "TRUE"),
        ])];

        let rules = parse_rule_table(&table).unwrap();
        match &rules.as_slice()[0].kind {
            RuleKind::Aggregate(rule) => {
                assert_eq!(
                    rule.operator,
                    AggregateOperator::new(AggregationKind::Sum, Comparator::Lte)
                );
                assert_eq!(rule.ref_agg, Some(AggregationKind::Sum));
                assert_eq!(rule.group_by.as_deref(), Some("RID"));
                assert_eq!(rule.group_mode, GroupMode::Representative);
                assert!(rule.distinct_per_group);
            }
            RuleKind::Row(_) => panic!("expected an aggregate rule"),
        }
    }

    #[test]
    fn test_aggregation_defaults_to_sum() {
        let table = vec![table_row(&[
            (LEVEL, "Aggregate"),
            (TARGET, "Area"),
            (CONDITION, "gt"),
            (COMPARE, "0"),
        ])];
        let rules = parse_rule_table(&table).unwrap();
        assert_eq!(rules.as_slice()[0].description(), "Area sum_gt 0");
    }

    #[test]
    fn test_lenient_skips_and_strict_rejects() {
        let table = vec![
            table_row(&[(LEVEL, "Sheet"), (TARGET, "Area"), (CONDITION, "gt")]),
            table_row(&[(TARGET, ""), (CONDITION, "gt")]),
            table_row(&[(TARGET, "Area"), (CONDITION, "gt"), (COMPARE, "0")]),
        ];

        let lenient = RuleTableImporter::new().import(&table).unwrap();
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient.as_slice()[0].id, 502);

        let strict = RuleTableImporter::new().strict(true).import(&table);
        assert!(matches!(strict, Err(DqmError::InvalidRule { .. })));
    }
}
