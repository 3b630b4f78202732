//! The rule engine.
//!
//! A run is a pure function of the dataset and the rules:
//!
//! 1. aggregate rules are evaluated per group (or once globally) and their
//!    failures collected as global error strings,
//! 2. row rules are evaluated on every row,
//! 3. full-row duplicates are flagged without failing the row,
//! 4. the [`Summary`](crate::core::Summary) is derived from the row verdicts.
//!
//! The engine never returns an error. Malformed rules degrade to skips or
//! vacuous passes and are reported through `tracing` warnings.
//!
//! ```rust
//! use dqm_guard::core::{Dataset, Row};
//! use dqm_guard::engine::RuleEngine;
//! use dqm_guard::rules::{AggregateRule, RowRule, Rule, RuleSet};
//!
//! # fn main() -> dqm_guard::error::Result<()> {
//! let dataset = Dataset::from_rows(vec![
//!     Row::new().with("value", 10).with("target", 5),
//!     Row::new().with("value", 20).with("target", 25),
//! ]);
//!
//! let rules = RuleSet::from_rules(vec![
//!     Rule::row(1, RowRule::new("value", "gt", "target").against_column()),
//!     Rule::aggregate(2, AggregateRule::new("value", "sum_gt", "100")),
//! ])?;
//!
//! let result = RuleEngine::default().execute(&dataset, &rules);
//! assert_eq!(result.summary.passed, 1);
//! assert_eq!(result.global_errors.len(), 1);
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod duplicates;
mod row;

pub use duplicates::{duplicate_indices, duplicate_references};

use crate::analyzers::profiler::DataProfiler;
use crate::core::{Dataset, EngineConfig, ExecutionResult, ProfiledExecution, Summary};
use crate::log_data_op;
use crate::rules::catalog::standard_rules;
use crate::rules::{Rule, RuleKind, RuleSet};
use row::RowEvaluator;
use std::time::Instant;
use tracing::{info, instrument};

/// Evaluates rule sets against datasets.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: EngineConfig,
}

impl RuleEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates `rules` against `dataset`.
    pub fn execute(&self, dataset: &Dataset, rules: &RuleSet) -> ExecutionResult {
        self.execute_rules(dataset, rules.as_slice())
    }

    /// Evaluates a slice of rules against `dataset`.
    #[instrument(skip(self, dataset, rules), fields(rows = dataset.len(), rules = rules.len()))]
    pub fn execute_rules(&self, dataset: &Dataset, rules: &[Rule]) -> ExecutionResult {
        let start = Instant::now();

        let global_errors: Vec<String> = rules
            .iter()
            .filter_map(|rule| match &rule.kind {
                RuleKind::Aggregate(body) => Some((rule, body)),
                RuleKind::Row(_) => None,
            })
            .flat_map(|(rule, body)| aggregate::evaluate_rule(rule, body, dataset, &self.config))
            .collect();

        let evaluator = RowEvaluator::new(rules, dataset, &self.config);
        let mut results: Vec<_> = dataset
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| evaluator.evaluate(i + 1, row))
            .collect();

        if self.config.flag_duplicates {
            for (result, reference) in results
                .iter_mut()
                .zip(duplicate_references(dataset.rows()))
            {
                result.is_duplicate = reference.is_some();
                result.duplicate_of = reference;
            }
        }

        let summary = Summary::from_results(&results);

        info!(
            rows = summary.total,
            row_rules = evaluator.rule_count(),
            passed = summary.passed,
            failed = summary.failed,
            global_errors = global_errors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Rule execution completed"
        );

        ExecutionResult {
            results,
            summary,
            global_errors,
        }
    }

    /// Evaluates `rules` and profiles the dataset in the same call.
    ///
    /// An empty rule set runs the built-in catalog instead.
    #[instrument(skip(self, dataset, rules), fields(rows = dataset.len(), rules = rules.len()))]
    pub fn execute_with_profile(&self, dataset: &Dataset, rules: &RuleSet) -> ProfiledExecution {
        let rules_applied = if rules.is_empty() {
            log_data_op!(self.config.log, "No rules supplied, applying the built-in catalog");
            standard_rules()
        } else {
            rules.clone()
        };

        let data_profile = DataProfiler::new().profile(dataset);
        let execution = self.execute(dataset, &rules_applied);

        ProfiledExecution {
            execution,
            data_profile,
            rules_applied: rules_applied.into(),
        }
    }
}
