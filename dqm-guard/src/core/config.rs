//! Engine configuration.

use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};

/// What to do with a row-level rule whose target column is absent from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumnPolicy {
    /// Skip the rule for that row; it neither passes nor fails.
    #[default]
    Skip,
    /// Record a `Column '<c>' not found` failure for the row.
    Fail,
}

/// Configuration for a [`RuleEngine`](crate::engine::RuleEngine).
///
/// # Examples
///
/// ```rust
/// use dqm_guard::core::{EngineConfig, MissingColumnPolicy};
///
/// let config = EngineConfig::builder()
///     .missing_column_policy(MissingColumnPolicy::Fail)
///     .aggregate_epsilon(1e-9)
///     .build();
///
/// assert_eq!(config.missing_column_policy, MissingColumnPolicy::Fail);
/// assert!(config.flag_duplicates);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Handling of row rules that target absent columns (default: skip)
    pub missing_column_policy: MissingColumnPolicy,
    /// Tolerance for aggregate comparisons (default: 1e-6)
    pub aggregate_epsilon: f64,
    /// Whether to flag duplicate rows (default: true)
    pub flag_duplicates: bool,
    /// Logging verbosity for engine runs
    pub log: LogConfig,
}

/// Default tolerance used by aggregate comparisons.
pub const DEFAULT_AGGREGATE_EPSILON: f64 = 1e-6;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            missing_column_policy: MissingColumnPolicy::Skip,
            aggregate_epsilon: DEFAULT_AGGREGATE_EPSILON,
            flag_duplicates: true,
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Strict configuration: absent columns fail the row.
    pub fn strict() -> Self {
        Self {
            missing_column_policy: MissingColumnPolicy::Fail,
            ..Self::default()
        }
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Sets the missing-column policy.
    pub fn missing_column_policy(mut self, policy: MissingColumnPolicy) -> Self {
        self.config.missing_column_policy = policy;
        self
    }

    /// Sets the aggregate comparison tolerance. Negative values are clamped to 0.
    pub fn aggregate_epsilon(mut self, epsilon: f64) -> Self {
        self.config.aggregate_epsilon = epsilon.max(0.0);
        self
    }

    /// Enables or disables duplicate-row flagging.
    pub fn flag_duplicates(mut self, enabled: bool) -> Self {
        self.config.flag_duplicates = enabled;
        self
    }

    /// Sets the logging configuration.
    pub fn log(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
