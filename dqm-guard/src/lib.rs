//! # DQM Guard - Data Quality Management for Tabular Data
//!
//! DQM Guard evaluates row-level and aggregate rules against spreadsheet-like
//! datasets, profiles their columns and runs quick health scans. It is built
//! for collection sheets where every row describes an entity (a village, a
//! farmer organisation, a plot) and the checks are simple comparisons,
//! ranges and cross-field consistency rules.
//!
//! ## Quick Start
//!
//! ```rust
//! use dqm_guard::prelude::*;
//!
//! # fn main() -> dqm_guard::error::Result<()> {
//! let dataset = Dataset::from_rows(vec![
//!     Row::new().with("value", 10).with("target", 5),
//!     Row::new().with("value", 20).with("target", 25),
//!     Row::new().with("value", 30).with("target", 15),
//!     Row::new().with("value", 40).with("target", 45),
//! ]);
//!
//! let mut rules = RuleSet::new();
//! rules.push(RuleKind::Row(RowRule::new("value", "gt", "target").against_column()));
//! rules.push(RuleKind::Aggregate(AggregateRule::new("value", "sum_gt", "90")));
//!
//! let result = RuleEngine::default().execute(&dataset, &rules);
//! assert_eq!(result.summary.passed, 2);
//! assert_eq!(result.summary.pass_percentage_label(), "50.0");
//! assert!(result.global_errors.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Rules
//!
//! Rules are plain data: a [`rules::Rule`] is an id plus either a row rule
//! (evaluated on every row) or an aggregate rule (evaluated once per group or
//! over the whole dataset). They serialize with serde and can be imported
//! from a rule table ([`rules::table`]) or taken from the built-in catalog
//! ([`rules::catalog`]).
//!
//! Row operators: `gt lt gte lte eq neq contains not_contains starts_with
//! is_blank not_blank consistency`. Aggregate operators combine a reduction
//! with a comparator: `sum_gt`, `avg_lte`, `max_lt`, `count_eq`, ...
//!
//! ## Failure semantics
//!
//! The engine never returns an error. Rules that reference absent columns
//! are skipped or failed according to
//! [`core::MissingColumnPolicy`]; unknown operators pass and are logged at
//! `warn`. Errors ([`error::DqmError`]) are reserved for loading data,
//! importing rule tables, editing rule sets and formatting reports.
//!
//! ## Architecture
//!
//! - **`core`**: values, rows, datasets, engine configuration and result types
//! - **`constraints`**: operand resolution, operators and aggregation
//! - **`rules`**: rule definitions, rule sets, rule-table import and the built-in catalog
//! - **`engine`**: the rule engine and duplicate detection
//! - **`analyzers`**: column type inference, data profiling and quick scans
//! - **`sources`**: CSV and JSON loaders backed by DataFusion
//! - **`formatters`**: JSON, console and row-level CSV reports
//! - **`logging`**: `tracing` configuration helpers

pub mod analyzers;
pub mod constraints;
pub mod core;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod rules;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
