//! Building blocks of rule evaluation.
//!
//! - [`resolve`] / [`resolve_first_non_zero`]: turn a rule operand or target
//!   into a value for a given row
//! - [`Operator`] / [`Comparator`]: the closed set of predicates
//! - [`aggregate`]: sum/avg/min/max/count over rows, optionally grouped
//!
//! ## Example
//!
//! ```rust
//! use dqm_guard::constraints::{resolve, Operator};
//! use dqm_guard::core::{ColumnType, Row};
//!
//! let row = Row::new().with("value", 10).with("target", 5);
//! let target = resolve("value", &row, true);
//! let operand = resolve("target", &row, true);
//!
//! assert!(Operator::parse("gt").evaluate(&target, &operand, ColumnType::Number));
//! ```

pub mod aggregation;
pub mod operators;
pub mod resolver;

pub use aggregation::{
    aggregate, aggregate_detailed, aggregate_rows, split_columns, Aggregate, AggregationKind,
};
pub use operators::{operators_for, Comparator, Operator, OperatorInfo};
pub use resolver::{resolve, resolve_first_non_zero};
