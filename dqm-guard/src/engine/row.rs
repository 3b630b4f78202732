//! Row phase: row-level rules evaluated on every row.

use crate::constraints::{resolve, resolve_first_non_zero, split_columns};
use crate::core::{
    CellValue, ColumnType, Dataset, EngineConfig, EvaluationResult, FailureReason,
    MissingColumnPolicy, Row, RuleEvaluation,
};
use crate::log_rule;
use crate::logging::truncate_field;
use crate::rules::{RowRule, Rule, RuleKind, TargetMode};
use tracing::warn;

/// A row rule with everything that does not depend on the row precomputed.
#[derive(Debug)]
struct PreparedRowRule<'a> {
    id: u64,
    body: &'a RowRule,
    description: String,
    name: String,
    message: String,
    value_type: ColumnType,
    required_columns: Vec<&'a str>,
}

impl<'a> PreparedRowRule<'a> {
    fn new(rule: &'a Rule, body: &'a RowRule, dataset: &Dataset) -> Self {
        let targets = split_columns(&body.column);
        let mut required_columns = match body.target_mode {
            TargetMode::Sum => targets.clone(),
            // Absent cells read as 0 when picking the first nonzero target.
            TargetMode::FirstNonZero if targets.len() > 1 => Vec::new(),
            TargetMode::FirstNonZero => targets.clone(),
        };
        // Multi-column operands are sums; absent cells count as 0 there.
        if body.operand_is_column {
            if let [single] = split_columns(&body.operand).as_slice() {
                required_columns.push(*single);
            }
        }

        let value_type = body.value_type.unwrap_or_else(|| match targets.as_slice() {
            [single] => dataset
                .column(single)
                .map_or(ColumnType::String, |column| column.column_type),
            [] => ColumnType::String,
            _ => ColumnType::Number,
        });

        Self {
            id: rule.id,
            body,
            description: body.description(),
            name: rule.display_name(),
            message: rule.failure_message(),
            value_type,
            required_columns,
        }
    }

    /// Applies the rule's empty-as-zero reading to a resolved value.
    fn read(&self, value: CellValue) -> CellValue {
        if self.body.empty_as_zero && value.trimmed_text().is_empty() {
            CellValue::Number(0.0)
        } else {
            value
        }
    }

    fn missing_column(&self, row: &Row) -> Option<&'a str> {
        self.required_columns
            .iter()
            .copied()
            .find(|column| !row.contains(column))
    }
}

/// Evaluates row rules against individual rows.
#[derive(Debug)]
pub(crate) struct RowEvaluator<'a> {
    rules: Vec<PreparedRowRule<'a>>,
    config: &'a EngineConfig,
}

impl<'a> RowEvaluator<'a> {
    pub(crate) fn new(rules: &'a [Rule], dataset: &Dataset, config: &'a EngineConfig) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match &rule.kind {
                RuleKind::Row(body) => Some(PreparedRowRule::new(rule, body, dataset)),
                RuleKind::Aggregate(_) => None,
            })
            .collect::<Vec<_>>();

        for rule in &rules {
            if !rule.body.operator.is_known() {
                warn!(
                    rule_id = rule.id,
                    operator = %rule.body.operator,
                    "Unknown operator, rule always passes"
                );
            }
            if let Some(column) = rule
                .required_columns
                .iter()
                .find(|column| !dataset.has_column(column))
            {
                warn!(
                    rule_id = rule.id,
                    column = %column,
                    policy = ?config.missing_column_policy,
                    "Rule references a column absent from the dataset"
                );
            }
        }

        Self { rules, config }
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluates every row rule on `row`, the `index`-th row (1-based).
    pub(crate) fn evaluate(&self, index: usize, row: &Row) -> EvaluationResult {
        let mut result = EvaluationResult::new(index);

        for rule in &self.rules {
            if let Some(column) = rule.missing_column(row) {
                match self.config.missing_column_policy {
                    MissingColumnPolicy::Skip => {
                        log_rule!(self.config.log, row = index, rule_id = rule.id, column, "Skipped: column absent");
                    }
                    MissingColumnPolicy::Fail => {
                        result.evaluations.push(RuleEvaluation {
                            rule_id: rule.id,
                            description: rule.description.clone(),
                            passed: false,
                            observed_value: CellValue::Null,
                        });
                        result.push_failure(FailureReason {
                            column: rule.body.column.clone(),
                            rule_name: rule.name.clone(),
                            message: format!("Column '{column}' not found"),
                        });
                    }
                }
                continue;
            }

            let value = rule.read(match rule.body.target_mode {
                TargetMode::Sum => resolve(&rule.body.column, row, true),
                TargetMode::FirstNonZero => resolve_first_non_zero(&rule.body.column, row),
            });
            let passed = if rule.body.skip_if_zero && is_zero_or_blank(&value) {
                true
            } else {
                let operand =
                    rule.read(resolve(&rule.body.operand, row, rule.body.operand_is_column));
                rule.body.operator.evaluate(&value, &operand, rule.value_type)
            };

            log_rule!(
                self.config.log,
                row = index,
                rule_id = rule.id,
                passed,
                value = %truncate_field(&value.to_string(), self.config.log.max_field_length),
                "Evaluated row rule"
            );

            if !passed {
                result.push_failure(FailureReason {
                    column: rule.body.column.clone(),
                    rule_name: rule.name.clone(),
                    message: rule.message.clone(),
                });
            }
            result.evaluations.push(RuleEvaluation {
                rule_id: rule.id,
                description: rule.description.clone(),
                passed,
                observed_value: value,
            });
        }

        result
    }
}

fn is_zero_or_blank(value: &CellValue) -> bool {
    value.is_blank() || value.as_number() == Some(0.0)
}
