//! Result types produced by an engine run.

use crate::analyzers::profiler::DataProfile;
use crate::core::CellValue;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Why a row failed a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReason {
    /// Column the rule targets
    pub column: String,
    /// Rule name, or its description when the rule is unnamed
    pub rule_name: String,
    /// Human-readable failure message
    pub message: String,
}

/// Outcome of one rule on one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// Rule identity
    pub rule_id: u64,
    /// `<column> <operator> <target>` description
    pub description: String,
    /// Whether the rule passed
    pub passed: bool,
    /// Resolved target value the rule looked at
    pub observed_value: CellValue,
}

/// Row-level verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 1-based row position in the dataset
    pub row_index: usize,
    /// True iff the row has no failure reasons
    pub passed: bool,
    /// Failures in rule order
    pub failure_reasons: Vec<FailureReason>,
    /// One entry per evaluated rule, in rule order
    pub evaluations: Vec<RuleEvaluation>,
    /// Whether an identical row appears earlier in the dataset
    pub is_duplicate: bool,
    /// 1-based index of the first identical row
    pub duplicate_of: Option<usize>,
}

impl EvaluationResult {
    /// Creates a passing result with no evaluations.
    pub fn new(row_index: usize) -> Self {
        Self {
            row_index,
            passed: true,
            failure_reasons: Vec::new(),
            evaluations: Vec::new(),
            is_duplicate: false,
            duplicate_of: None,
        }
    }

    /// Records a failure and marks the row as failed.
    pub fn push_failure(&mut self, reason: FailureReason) {
        self.passed = false;
        self.failure_reasons.push(reason);
    }

    /// Failure messages in order.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failure_reasons
            .iter()
            .map(|reason| reason.message.clone())
            .collect()
    }

    /// Failure messages joined with `separator`.
    pub fn joined_reasons(&self, separator: &str) -> String {
        self.failure_messages().join(separator)
    }

    /// `PASS` or `FAIL`.
    pub fn status_label(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// Dataset-wide pass/fail counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of rows evaluated
    pub total: usize,
    /// Rows with no row-level failures
    pub passed: usize,
    /// Rows with at least one row-level failure
    pub failed: usize,
    /// `passed / total * 100`, one decimal; 0 for an empty dataset
    pub pass_percentage: f64,
    /// `pass_percentage / 10`, one decimal
    pub quality_score: f64,
    /// 1-based indices of failing rows
    pub impacted_rows: BTreeSet<usize>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Summary {
    /// Builds the summary for a list of row results.
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let total = results.len();
        let impacted_rows: BTreeSet<usize> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.row_index)
            .collect();
        let failed = impacted_rows.len();
        let passed = total - failed;

        let pass_percentage = if total == 0 {
            0.0
        } else {
            round1(passed as f64 / total as f64 * 100.0)
        };

        Self {
            total,
            passed,
            failed,
            pass_percentage,
            quality_score: round1(pass_percentage / 10.0),
            impacted_rows,
        }
    }

    /// Pass percentage formatted with one decimal (`"0.0"` when empty).
    pub fn pass_percentage_label(&self) -> String {
        format!("{:.1}", self.pass_percentage)
    }

    /// Quality score formatted with one decimal.
    pub fn quality_score_label(&self) -> String {
        format!("{:.1}", self.quality_score)
    }
}

/// Output of [`RuleEngine::execute`](crate::engine::RuleEngine::execute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Row verdicts in dataset order
    pub results: Vec<EvaluationResult>,
    /// Dataset-wide counts
    pub summary: Summary,
    /// Aggregate failure messages in rule order
    pub global_errors: Vec<String>,
}

impl ExecutionResult {
    /// Flattened failure messages for a 1-based row index.
    ///
    /// Returns an empty list for rows outside the dataset.
    pub fn failure_strings(&self, row_index: usize) -> Vec<String> {
        row_index
            .checked_sub(1)
            .and_then(|i| self.results.get(i))
            .map(EvaluationResult::failure_messages)
            .unwrap_or_default()
    }

    /// Results for rows flagged as duplicates.
    pub fn duplicates(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| r.is_duplicate)
    }

    /// True if no row failed and no aggregate rule failed.
    pub fn is_clean(&self) -> bool {
        self.summary.failed == 0 && self.global_errors.is_empty()
    }
}

/// Output of [`RuleEngine::execute_with_profile`](crate::engine::RuleEngine::execute_with_profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfiledExecution {
    /// Rule verdicts
    pub execution: ExecutionResult,
    /// Column statistics for the same dataset
    pub data_profile: DataProfile,
    /// Rules that were actually applied (the built-in catalog when none were given)
    pub rules_applied: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, passed: bool) -> EvaluationResult {
        let mut r = EvaluationResult::new(index);
        if !passed {
            r.push_failure(FailureReason {
                column: "value".into(),
                rule_name: "value gt target".into(),
                message: "value gt Col(target)".into(),
            });
        }
        r
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![result(1, true), result(2, false), result(3, true)];
        let summary = Summary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pass_percentage, 66.7);
        assert_eq!(summary.quality_score, 6.7);
        assert_eq!(summary.impacted_rows.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.pass_percentage, 0.0);
        assert_eq!(summary.pass_percentage_label(), "0.0");
        assert_eq!(summary.quality_score_label(), "0.0");
    }

    #[test]
    fn test_failure_strings() {
        let mut failing = result(1, false);
        failing.push_failure(FailureReason {
            column: "area".into(),
            rule_name: "area gte 0".into(),
            message: "area gte 0".into(),
        });
        let execution = ExecutionResult {
            summary: Summary::from_results(std::slice::from_ref(&failing)),
            results: vec![failing],
            global_errors: vec![],
        };

        assert_eq!(
            execution.failure_strings(1),
            vec!["value gt Col(target)".to_string(), "area gte 0".to_string()]
        );
        assert!(execution.failure_strings(0).is_empty());
        assert!(execution.failure_strings(2).is_empty());
        assert_eq!(
            execution.results[0].joined_reasons("; "),
            "value gt Col(target); area gte 0"
        );
        assert_eq!(execution.results[0].status_label(), "FAIL");
        assert!(!execution.is_clean());
    }
}
