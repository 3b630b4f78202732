//! Rule definitions and rule sets.
//!
//! Rules are plain data: a [`Rule`] is an id, optional display metadata and a
//! tagged [`RuleKind`] that is either a [`RowRule`] or an [`AggregateRule`].
//! The engine interprets them; nothing executable is stored in a rule, so
//! rule sets serialize, compare and round-trip through JSON.
//!
//! ```rust
//! use dqm_guard::rules::{AggregateRule, Rule, RowRule, RuleSet};
//!
//! # fn main() -> dqm_guard::error::Result<()> {
//! let mut rules = RuleSet::new();
//! rules.add(Rule::row(1, RowRule::new("value", "gt", "target").against_column()))?;
//! rules.add(Rule::aggregate(2, AggregateRule::new("value", "sum_gt", "90")))?;
//!
//! let json = serde_json::to_string(&rules)?;
//! let back: RuleSet = serde_json::from_str(&json)?;
//! assert_eq!(back, rules);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod table;

use crate::constraints::operators::normalize_id;
use crate::constraints::{AggregationKind, Comparator, Operator};
use crate::core::ColumnType;
use crate::error::{DqmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An aggregate operator: a reduction paired with a comparison (`sum_gt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregateOperator {
    /// A recognised `<kind>_<cmp>` operator
    Compare {
        /// Reduction applied to the target column
        kind: AggregationKind,
        /// Comparison against the reference value
        comparator: Comparator,
    },
    /// Unrecognised id; always passes
    Unknown(String),
}

impl AggregateOperator {
    /// Creates an operator from its parts.
    pub fn new(kind: AggregationKind, comparator: Comparator) -> Self {
        AggregateOperator::Compare { kind, comparator }
    }

    /// Parses `<kind>_<cmp>` ids such as `sum_gte` or `avg_lt`.
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize_id(raw);
        normalized
            .split_once('_')
            .and_then(|(kind, comparator)| {
                Some(AggregateOperator::Compare {
                    kind: AggregationKind::parse(kind)?,
                    comparator: Comparator::parse(comparator)?,
                })
            })
            .unwrap_or_else(|| AggregateOperator::Unknown(raw.trim().to_string()))
    }

    /// Canonical id.
    pub fn id(&self) -> String {
        match self {
            AggregateOperator::Compare { kind, comparator } => {
                format!("{}_{}", kind.id(), comparator.id())
            }
            AggregateOperator::Unknown(raw) => raw.clone(),
        }
    }

    /// Reduction kind, if recognised.
    pub fn kind(&self) -> Option<AggregationKind> {
        match self {
            AggregateOperator::Compare { kind, .. } => Some(*kind),
            AggregateOperator::Unknown(_) => None,
        }
    }
}

impl From<String> for AggregateOperator {
    fn from(raw: String) -> Self {
        AggregateOperator::parse(&raw)
    }
}

impl From<&str> for AggregateOperator {
    fn from(raw: &str) -> Self {
        AggregateOperator::parse(raw)
    }
}

impl From<AggregateOperator> for String {
    fn from(operator: AggregateOperator) -> Self {
        operator.id()
    }
}

impl fmt::Display for AggregateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// How a comma-joined row-rule target collapses to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Sum of the cells, non-numeric or absent cells counting as 0
    #[default]
    Sum,
    /// First cell, in listed order, holding a nonzero number; 0 when none does
    FirstNonZero,
}

impl TargetMode {
    fn is_sum(&self) -> bool {
        *self == TargetMode::Sum
    }
}

/// A rule evaluated independently on every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRule {
    /// Target column, or comma-joined columns combined per `target_mode`
    pub column: String,
    /// Predicate to apply
    pub operator: Operator,
    /// Literal value or column name(s) to compare against
    #[serde(default)]
    pub operand: String,
    /// Whether `operand` names columns
    #[serde(default)]
    pub operand_is_column: bool,
    /// Comparison semantics; the dataset's column type when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ColumnType>,
    /// Do not apply the rule to rows whose target value is zero or blank
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_if_zero: bool,
    /// Read null or empty cells on either side as 0
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub empty_as_zero: bool,
    /// Combination of a multi-column target
    #[serde(default, skip_serializing_if = "TargetMode::is_sum")]
    pub target_mode: TargetMode,
}

impl RowRule {
    /// Creates a rule comparing `column` against a literal `operand`.
    pub fn new(
        column: impl Into<String>,
        operator: impl Into<Operator>,
        operand: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            operand: operand.into(),
            operand_is_column: false,
            value_type: None,
            skip_if_zero: false,
            empty_as_zero: false,
            target_mode: TargetMode::Sum,
        }
    }

    /// Treats the operand as column name(s).
    pub fn against_column(mut self) -> Self {
        self.operand_is_column = true;
        self
    }

    /// Forces numeric or string comparison semantics.
    pub fn with_value_type(mut self, value_type: ColumnType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Skips rows whose target value is zero or blank.
    pub fn skip_if_zero(mut self) -> Self {
        self.skip_if_zero = true;
        self
    }

    /// Reads null or empty cells as 0 on both sides of the comparison.
    ///
    /// Not-available markers and other text stay as they are.
    pub fn empty_as_zero(mut self) -> Self {
        self.empty_as_zero = true;
        self
    }

    /// Uses the first nonzero cell of a multi-column target instead of the sum.
    pub fn first_non_zero(mut self) -> Self {
        self.target_mode = TargetMode::FirstNonZero;
        self
    }

    /// `<column> <operator> <target>`, with `Col(<name>)` for column operands.
    pub fn description(&self) -> String {
        let target = if self.operand_is_column {
            format!("Col({})", self.operand)
        } else {
            self.operand.clone()
        };
        format!("{} {} {}", self.column, self.operator, target)
            .trim_end()
            .to_string()
    }
}

/// How an aggregate rule with a group-by column is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// One verdict per group, aggregating that group's rows
    #[default]
    PerGroup,
    /// One verdict over the first row of each group
    Representative,
}

/// A rule evaluated over a reduction of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRule {
    /// Target column, or comma-joined columns
    pub column: String,
    /// Reduction and comparison
    pub operator: AggregateOperator,
    /// Literal threshold or reference column(s)
    #[serde(default)]
    pub operand: String,
    /// Whether `operand` names columns
    #[serde(default)]
    pub operand_is_column: bool,
    /// Reduction for the reference column; the operator's own when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_agg: Option<AggregationKind>,
    /// Group-by column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// Deduplicate values before reduction
    #[serde(default)]
    pub distinct_per_group: bool,
    /// Evaluation mode when `group_by` is set
    #[serde(default)]
    pub group_mode: GroupMode,
}

impl AggregateRule {
    /// Creates a rule comparing an aggregate of `column` against a literal.
    pub fn new(
        column: impl Into<String>,
        operator: impl Into<AggregateOperator>,
        operand: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            operand: operand.into(),
            operand_is_column: false,
            ref_agg: None,
            group_by: None,
            distinct_per_group: false,
            group_mode: GroupMode::PerGroup,
        }
    }

    /// Treats the operand as column name(s).
    pub fn against_column(mut self) -> Self {
        self.operand_is_column = true;
        self
    }

    /// Sets the reduction applied to the reference column.
    pub fn with_ref_agg(mut self, kind: AggregationKind) -> Self {
        self.ref_agg = Some(kind);
        self
    }

    /// Evaluates the rule once per value of `column`.
    pub fn grouped_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    /// Deduplicates values before reduction.
    pub fn distinct(mut self) -> Self {
        self.distinct_per_group = true;
        self
    }

    /// Sets the group evaluation mode.
    pub fn with_group_mode(mut self, mode: GroupMode) -> Self {
        self.group_mode = mode;
        self
    }

    /// Reduction used for a column operand.
    pub fn reference_kind(&self) -> Option<AggregationKind> {
        self.ref_agg.or_else(|| self.operator.kind())
    }

    /// Label of the reference side: the literal, or `<KIND>(<column>)`.
    pub fn reference_label(&self) -> String {
        match (self.operand_is_column, self.reference_kind()) {
            (true, Some(kind)) => format!("{}({})", kind.id().to_uppercase(), self.operand),
            (true, None) => format!("Col({})", self.operand),
            (false, _) => self.operand.clone(),
        }
    }

    /// `<column> <operator> <reference>`.
    pub fn description(&self) -> String {
        format!("{} {} {}", self.column, self.operator, self.reference_label())
    }
}

/// The level-tagged body of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum RuleKind {
    /// Row-level rule
    Row(RowRule),
    /// Aggregate-level rule
    Aggregate(AggregateRule),
}

/// A validation rule with a stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Identity within a rule set
    pub id: u64,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Failure message for row rules; the description when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Rule body
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    /// Creates a row-level rule.
    pub fn row(id: u64, rule: RowRule) -> Self {
        Self {
            id,
            name: None,
            message: None,
            kind: RuleKind::Row(rule),
        }
    }

    /// Creates an aggregate-level rule.
    pub fn aggregate(id: u64, rule: AggregateRule) -> Self {
        Self {
            id,
            name: None,
            message: None,
            kind: RuleKind::Aggregate(rule),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// True for aggregate-level rules.
    pub fn is_aggregate(&self) -> bool {
        matches!(self.kind, RuleKind::Aggregate(_))
    }

    /// Target column specification.
    pub fn column(&self) -> &str {
        match &self.kind {
            RuleKind::Row(rule) => &rule.column,
            RuleKind::Aggregate(rule) => &rule.column,
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match &self.kind {
            RuleKind::Row(rule) => rule.description(),
            RuleKind::Aggregate(rule) => rule.description(),
        }
    }

    /// The name, or the description for unnamed rules.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.description())
    }

    /// The failure message, or the description when none is set.
    pub fn failure_message(&self) -> String {
        self.message.clone().unwrap_or_else(|| self.description())
    }
}

/// An ordered collection of rules with unique ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a rule set, rejecting duplicate ids.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        let mut set = Self::new();
        for rule in rules {
            set.add(rule)?;
        }
        Ok(set)
    }

    /// Appends a rule.
    ///
    /// # Errors
    ///
    /// Returns [`DqmError::DuplicateRuleId`] if the id is already taken.
    pub fn add(&mut self, rule: Rule) -> Result<()> {
        if self.contains(rule.id) {
            return Err(DqmError::DuplicateRuleId { id: rule.id });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Appends a rule body under the next free id and returns that id.
    pub fn push(&mut self, kind: RuleKind) -> u64 {
        let id = self.next_id();
        self.rules.push(Rule {
            id,
            name: None,
            message: None,
            kind,
        });
        id
    }

    /// Replaces the rule with the same id, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`DqmError::RuleNotFound`] if no rule has that id.
    pub fn update(&mut self, rule: Rule) -> Result<()> {
        let slot = self
            .rules
            .iter_mut()
            .find(|existing| existing.id == rule.id)
            .ok_or(DqmError::RuleNotFound { id: rule.id })?;
        *slot = rule;
        Ok(())
    }

    /// Removes and returns the rule with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`DqmError::RuleNotFound`] if no rule has that id.
    pub fn remove(&mut self, id: u64) -> Result<Rule> {
        let index = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or(DqmError::RuleNotFound { id })?;
        Ok(self.rules.remove(index))
    }

    /// Looks up a rule by id.
    pub fn get(&self, id: u64) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// True if a rule has the given id.
    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// One more than the largest id in use (1 for an empty set).
    pub fn next_id(&self) -> u64 {
        self.rules.iter().map(|rule| rule.id).max().map_or(1, |id| id + 1)
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rules as a slice.
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<Rule>> for RuleSet {
    type Error = DqmError;

    fn try_from(rules: Vec<Rule>) -> Result<Self> {
        Self::from_rules(rules)
    }
}

impl From<RuleSet> for Vec<Rule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_gt_target() -> Rule {
        Rule::row(1, RowRule::new("value", "gt", "target").against_column())
    }

    #[test]
    fn test_aggregate_operator_parsing() {
        assert_eq!(
            AggregateOperator::parse("sum_gt"),
            AggregateOperator::new(AggregationKind::Sum, Comparator::Gt)
        );
        assert_eq!(
            AggregateOperator::parse("AVG_LTE"),
            AggregateOperator::new(AggregationKind::Avg, Comparator::Lte)
        );
        assert_eq!(
            AggregateOperator::parse("count_neq").id(),
            "count_neq"
        );
        assert_eq!(
            AggregateOperator::parse("median_gt"),
            AggregateOperator::Unknown("median_gt".to_string())
        );
        assert_eq!(
            AggregateOperator::parse("sum"),
            AggregateOperator::Unknown("sum".to_string())
        );
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(value_gt_target().description(), "value gt Col(target)");
        assert_eq!(RowRule::new("state", "is_blank", "").description(), "state is_blank");

        let agg = AggregateRule::new("value", "sum_gt", "target").against_column();
        assert_eq!(agg.description(), "value sum_gt SUM(target)");
        let with_ref = agg.with_ref_agg(AggregationKind::Max);
        assert_eq!(with_ref.reference_label(), "MAX(target)");
    }

    #[test]
    fn test_display_name_and_message_fallbacks() {
        let rule = value_gt_target();
        assert_eq!(rule.display_name(), "value gt Col(target)");
        assert_eq!(rule.failure_message(), "value gt Col(target)");

        let named = rule.with_name("Value check").with_message("value too small");
        assert_eq!(named.display_name(), "Value check");
        assert_eq!(named.failure_message(), "value too small");
    }

    #[test]
    fn test_rule_serde_shape() {
        let rule = Rule::aggregate(
            7,
            AggregateRule::new("Agri", "sum_lte", "Geo")
                .against_column()
                .grouped_by("RID")
                .distinct(),
        );
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["level"], "aggregate");
        assert_eq!(json["operator"], "sum_lte");
        assert_eq!(json["group_by"], "RID");

        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_row_rule_options_serialize_only_when_set() {
        let plain = serde_json::to_value(RowRule::new("a", "gt", "1")).unwrap();
        assert!(plain.get("empty_as_zero").is_none());
        assert!(plain.get("target_mode").is_none());

        let rule = RowRule::new("s3,s2,s1", "lte", "agri")
            .against_column()
            .first_non_zero()
            .empty_as_zero();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["target_mode"], "first_non_zero");
        assert_eq!(json["empty_as_zero"], true);
        assert_eq!(serde_json::from_value::<RowRule>(json).unwrap(), rule);
    }

    #[test]
    fn test_rule_set_mutation() {
        let mut rules = RuleSet::new();
        rules.add(value_gt_target()).unwrap();
        assert!(matches!(
            rules.add(value_gt_target()),
            Err(DqmError::DuplicateRuleId { id: 1 })
        ));

        let id = rules.push(RuleKind::Aggregate(AggregateRule::new("value", "sum_gt", "90")));
        assert_eq!(id, 2);
        assert_eq!(rules.next_id(), 3);

        let updated = Rule::row(1, RowRule::new("value", "lt", "100"));
        rules.update(updated.clone()).unwrap();
        assert_eq!(rules.get(1), Some(&updated));
        assert_eq!(rules.as_slice()[0].id, 1);

        assert!(matches!(
            rules.update(Rule::row(9, RowRule::new("x", "eq", "1"))),
            Err(DqmError::RuleNotFound { id: 9 })
        ));

        let removed = rules.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(rules.len(), 1);
        assert!(rules.remove(1).is_err());
    }

    #[test]
    fn test_rule_set_rejects_duplicate_ids_on_deserialize() {
        let rule = serde_json::to_value(value_gt_target()).unwrap();
        let json = serde_json::Value::Array(vec![rule.clone(), rule]);
        assert!(serde_json::from_value::<RuleSet>(json).is_err());
    }
}
