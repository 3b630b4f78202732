//! Logging for engine runs.
//!
//! Everything goes through `tracing`. Run-level events (start, completion,
//! catalog fallback, loading) are always cheap. Per-row and per-group rule
//! outcomes are not: a 10 000-row sheet with 15 rules produces 150 000 of
//! them, so they only fire when [`LogConfig::log_rule_details`] is set. Use [`log_rule!`](crate::log_rule) and
//! [`log_data_op!`](crate::log_data_op) for those.
//!
//! Installing a subscriber is left to the application; [`setup`] offers a
//! ready-made one.

/// Which engine events are logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log every rule outcome at `debug` (per row and per group)
    pub log_rule_details: bool,
    /// Log loading, profiling and catalog fallback at `info`
    pub log_data_operations: bool,
    /// Cell values longer than this are cut before being logged
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_rule_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Every rule outcome, with long cell values.
    pub fn verbose() -> Self {
        Self {
            log_rule_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Warnings and run summaries only.
    pub fn quiet() -> Self {
        Self {
            log_rule_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }
}

/// Emits a `debug` event when rule details are enabled in the given [`LogConfig`].
#[macro_export]
macro_rules! log_rule {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_rule_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Emits an `info` event when data operations are enabled in the given [`LogConfig`].
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Cuts `value` to `max_length` characters, marking the cut.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}...(truncated)", &value[..cut]),
        None => value.to_string(),
    }
}

/// A `tracing-subscriber` setup for applications embedding the engine.
pub mod setup {
    use crate::error::{DqmError, Result};
    use tracing::Level;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    /// Output format of the installed subscriber.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum LogFormat {
        /// Multi-line human-readable output
        Pretty,
        /// One line per event
        #[default]
        Compact,
        /// One JSON object per event, for log shippers
        Json,
    }

    /// Subscriber settings.
    ///
    /// The filter has a global level and a separate level for the
    /// `dqm_guard` target. `RUST_LOG` overrides both.
    #[derive(Debug, Clone)]
    pub struct SubscriberConfig {
        global_level: Level,
        engine_level: Level,
        directives: Option<String>,
        format: LogFormat,
    }

    impl Default for SubscriberConfig {
        fn default() -> Self {
            Self {
                global_level: Level::WARN,
                engine_level: Level::INFO,
                directives: None,
                format: LogFormat::Compact,
            }
        }
    }

    impl SubscriberConfig {
        /// Warnings globally, engine events at `info`.
        pub fn new() -> Self {
            Self::default()
        }

        /// JSON output with engine events at `info`.
        pub fn json() -> Self {
            Self {
                format: LogFormat::Json,
                ..Self::default()
            }
        }

        /// Level applied to every target but the engine.
        pub fn global_level(mut self, level: Level) -> Self {
            self.global_level = level;
            self
        }

        /// Level applied to the `dqm_guard` target.
        pub fn engine_level(mut self, level: Level) -> Self {
            self.engine_level = level;
            self
        }

        /// Replaces the generated filter with explicit `EnvFilter` directives.
        pub fn directives(mut self, directives: impl Into<String>) -> Self {
            self.directives = Some(directives.into());
            self
        }

        pub fn format(mut self, format: LogFormat) -> Self {
            self.format = format;
            self
        }

        /// The `EnvFilter` directives this configuration installs.
        pub fn filter_directives(&self) -> String {
            self.directives.clone().unwrap_or_else(|| {
                format!(
                    "{},dqm_guard={}",
                    self.global_level.as_str().to_lowercase(),
                    self.engine_level.as_str().to_lowercase()
                )
            })
        }
    }

    /// Installs a global subscriber.
    ///
    /// Fails if the directives do not parse or a global subscriber is
    /// already installed.
    ///
    /// ```rust,no_run
    /// use dqm_guard::logging::setup::{init_logging, SubscriberConfig};
    /// use tracing::Level;
    ///
    /// # fn main() -> dqm_guard::error::Result<()> {
    /// init_logging(&SubscriberConfig::json().engine_level(Level::DEBUG))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn init_logging(config: &SubscriberConfig) -> Result<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(config.filter_directives()).map_err(|e| {
                DqmError::Configuration(format!("Invalid log filter directives: {e}"))
            })?,
        };

        let layer = match config.format {
            LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
            LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .map_err(|e| DqmError::Configuration(format!("Could not install subscriber: {e}")))
    }
}
