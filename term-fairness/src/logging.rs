//! Logging utilities and configuration for term-fairness.
//!
//! Scoring runs emit `tracing` events per group and per comparison. On wide
//! audits (many sensitive values, pairwise mode) that is a lot of output, so
//! the per-item events are gated behind [`LogConfig`] flags.

use tracing::Level;

/// Verbosity controls for fairness analysis.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for term-fairness components
    pub base_level: Level,
    /// Whether to log every resolved group and its moments
    pub log_group_details: bool,
    /// Whether to log every measured distance
    pub log_distance_details: bool,
    /// Whether to log aggregated scores
    pub log_scores: bool,
    /// Maximum length of logged group labels
    pub max_label_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_group_details: false,
            log_distance_details: false,
            log_scores: true,
            max_label_length: 128,
        }
    }
}

impl LogConfig {
    /// Logs every group and distance.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_group_details: true,
            log_distance_details: true,
            log_scores: true,
            max_label_length: 512,
        }
    }

    /// Warnings only.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_group_details: false,
            log_distance_details: false,
            log_scores: false,
            max_label_length: 64,
        }
    }

    /// Shortens a group label for logging.
    pub fn label(&self, label: &str) -> String {
        truncate_field(label, self.max_label_length)
    }
}

/// Debug logging that only evaluates its arguments when the configured base
/// level admits debug output.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs a per-group event when group details are enabled.
#[macro_export]
macro_rules! log_group {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_group_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs a per-comparison event when distance details are enabled.
#[macro_export]
macro_rules! log_distance {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_distance_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Logs an aggregated score when score logging is enabled.
#[macro_export]
macro_rules! log_score {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_scores {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for binaries and tests that consume this crate.
pub mod setup {
    use tracing::Level;

    /// Configuration for installing a global `tracing` subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside this crate
        pub level: Level,
        /// Log level for term-fairness
        pub fairness_level: Level,
        /// Emit JSON lines instead of human-readable output
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                fairness_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings from dependencies, info from this crate.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                fairness_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Human-readable debug output.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                fairness_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for everything outside this crate.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for term-fairness.
        pub fn with_fairness_level(mut self, level: Level) -> Self {
            self.fairness_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},term_fairness={}",
                    self.level.as_str().to_lowercase(),
                    self.fairness_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_fairness::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
