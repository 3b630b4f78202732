//! Aggregate phase: aggregate rules evaluated per group or over the dataset.

use crate::constraints::{aggregate_rows, split_columns, Aggregate};
use crate::core::{parse_number, Dataset, EngineConfig, Row};
use crate::log_rule;
use crate::rules::{AggregateOperator, AggregateRule, GroupMode, Rule};
use std::collections::HashMap;
use tracing::warn;

const GLOBAL: &str = "Global";

/// A slice of the dataset that receives one verdict.
struct Partition<'a> {
    label: String,
    rows: Vec<&'a Row>,
}

/// Evaluates one aggregate rule and returns its failure messages.
pub(crate) fn evaluate_rule(
    rule: &Rule,
    body: &AggregateRule,
    dataset: &Dataset,
    config: &EngineConfig,
) -> Vec<String> {
    let (kind, comparator) = match &body.operator {
        AggregateOperator::Compare { kind, comparator } => (*kind, *comparator),
        AggregateOperator::Unknown(raw) => {
            warn!(rule_id = rule.id, operator = %raw, "Unknown aggregate operator, rule always passes");
            return Vec::new();
        }
    };

    if let Some(column) = split_columns(&body.column)
        .into_iter()
        .find(|column| !dataset.has_column(column))
    {
        warn!(rule_id = rule.id, column, "Aggregate rule targets a column absent from the dataset");
    }

    let representative_by = match body.group_mode {
        GroupMode::Representative => body.group_by.as_deref(),
        GroupMode::PerGroup => None,
    };
    // Representative rows are already one per entity; distinct does not apply.
    let distinct_applied = body.distinct_per_group && representative_by.is_none();
    let reference_kind = body.reference_kind().unwrap_or(kind);
    let mut failures = Vec::new();

    for partition in partitions(rule, body, dataset) {
        let target = aggregate_rows(
            &partition.rows,
            &body.column,
            kind,
            representative_by,
            body.distinct_per_group,
        );
        let Some(target_value) = evaluable(&target) else {
            log_rule!(config.log, rule_id = rule.id, group = %partition.label, "Skipped: no values");
            continue;
        };

        let compare_value = if body.operand_is_column {
            aggregate_rows(
                &partition.rows,
                &body.operand,
                reference_kind,
                representative_by,
                body.distinct_per_group,
            )
            .value
        } else {
            parse_number(&body.operand)
        };

        let passed = compare_value.is_some_and(|compare| {
            comparator.compare_with_tolerance(target_value, compare, config.aggregate_epsilon)
        });

        log_rule!(
            config.log,
            rule_id = rule.id,
            group = %partition.label,
            target = target_value,
            compare = ?compare_value,
            passed,
            "Evaluated aggregate rule"
        );

        if !passed {
            let distinct = if distinct_applied { " [DISTINCT]" } else { "" };
            let compare_text =
                compare_value.map_or_else(|| "n/a".to_string(), |compare| format!("{compare:.2}"));
            failures.push(format!(
                "FAIL [{}]: {}({}{}) is {:.2}, expected {} {} ({})",
                partition.label,
                kind.id().to_uppercase(),
                body.column,
                distinct,
                target_value,
                comparator.id(),
                body.reference_label(),
                compare_text,
            ));
        }
    }

    failures
}

/// The target value, unless the aggregate saw no numeric values.
fn evaluable(target: &Aggregate) -> Option<f64> {
    if target.is_empty() {
        None
    } else {
        target.value
    }
}

fn partitions<'a>(rule: &Rule, body: &AggregateRule, dataset: &'a Dataset) -> Vec<Partition<'a>> {
    let whole = || {
        vec![Partition {
            label: GLOBAL.to_string(),
            rows: dataset.rows().iter().collect(),
        }]
    };

    let group_by = match (&body.group_by, body.group_mode) {
        (Some(group_by), GroupMode::PerGroup) => group_by,
        _ => return whole(),
    };

    if !dataset.has_column(group_by) {
        warn!(
            rule_id = rule.id,
            group_by = %group_by,
            "Group-by column absent from the dataset, evaluating globally"
        );
        return whole();
    }

    let mut groups: Vec<Partition<'a>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in dataset.rows() {
        let key = row.get(group_by).map(ToString::to_string).unwrap_or_default();
        let position = *positions.entry(key.clone()).or_insert_with(|| {
            groups.push(Partition {
                label: format!("{group_by}={key}"),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].rows.push(row);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            Row::new().with("RID", "R1").with("Agri", 40).with("Crop", 30),
            Row::new().with("RID", "R1").with("Agri", 40).with("Crop", 15),
            Row::new().with("RID", "R2").with("Agri", 25).with("Crop", 20),
        ])
    }

    fn run(body: AggregateRule) -> Vec<String> {
        let rule = Rule::aggregate(1, body.clone());
        evaluate_rule(&rule, &body, &dataset(), &EngineConfig::default())
    }

    #[test]
    fn test_per_group_failure_message() {
        let failures = run(
            AggregateRule::new("Crop", "sum_lte", "Agri")
                .against_column()
                .grouped_by("RID")
                .distinct(),
        );
        assert_eq!(
            failures,
            vec!["FAIL [RID=R1]: SUM(Crop [DISTINCT]) is 45.00, expected lte SUM(Agri) (40.00)".to_string()]
        );
    }

    #[test]
    fn test_global_literal_comparison() {
        let failures = run(AggregateRule::new("Crop", "max_lt", "25"));
        assert_eq!(
            failures,
            vec!["FAIL [Global]: MAX(Crop) is 30.00, expected lt 25 (25.00)".to_string()]
        );
        assert!(run(AggregateRule::new("Crop", "max_lt", "31")).is_empty());
    }

    #[test]
    fn test_representative_mode_gives_one_verdict() {
        let body = AggregateRule::new("Agri", "sum_eq", "65")
            .grouped_by("RID")
            .with_group_mode(GroupMode::Representative);
        assert!(run(body).is_empty());

        let failing = AggregateRule::new("Agri", "sum_gt", "65")
            .grouped_by("RID")
            .with_group_mode(GroupMode::Representative);
        assert_eq!(run(failing).len(), 1);
    }

    #[test]
    fn test_representative_mode_omits_distinct_tag() {
        let failures = run(
            AggregateRule::new("Agri", "sum_gt", "100")
                .grouped_by("RID")
                .distinct()
                .with_group_mode(GroupMode::Representative),
        );
        assert_eq!(
            failures,
            vec!["FAIL [Global]: SUM(Agri) is 65.00, expected gt 100 (100.00)".to_string()]
        );
    }

    #[test]
    fn test_empty_target_is_skipped_and_bad_literal_fails() {
        assert!(run(AggregateRule::new("Missing", "sum_gt", "1")).is_empty());

        let failures = run(AggregateRule::new("Crop", "sum_gt", "lots"));
        assert_eq!(
            failures,
            vec!["FAIL [Global]: SUM(Crop) is 65.00, expected gt lots (n/a)".to_string()]
        );
    }

    #[test]
    fn test_unknown_operator_passes() {
        assert!(run(AggregateRule::new("Crop", "median_gt", "1000")).is_empty());
    }

    #[test]
    fn test_absent_group_by_evaluates_globally() {
        let failures = run(AggregateRule::new("Crop", "sum_lt", "10").grouped_by("Village"));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("FAIL [Global]"));
    }
}
