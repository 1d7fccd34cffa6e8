//! Logging bootstrap shared by the binary and tests.
//!
//! Configuration comes from the environment:
//!
//! - `AGENTLOG_LOG`: filter directive, e.g. `debug` or `agentlog_common=trace`
//! - `AGENTLOG_LOG_FORMAT`: `pretty` (default) or `json`
//!
//! Logs always go to stderr; stdout belongs to prompts and status lines.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "AGENTLOG_LOG";
pub const LOG_FORMAT_ENV: &str = "AGENTLOG_LOG_FORMAT";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// Problems found while reading the environment, logged after init.
    pub warnings: Vec<String>,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            warnings: Vec::new(),
        }
    }

    /// Read `AGENTLOG_LOG` and `AGENTLOG_LOG_FORMAT`, falling back to
    /// `default_level` and pretty output.
    pub fn from_env(default_level: &str) -> Self {
        Self::from_lookup(default_level, |key| std::env::var(key).ok())
    }

    fn from_lookup(default_level: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new(default_level);

        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            if EnvFilter::try_new(&level).is_ok() {
                config.level = level;
            } else {
                config
                    .warnings
                    .push(format!("invalid {LOG_ENV} value '{level}', using '{default_level}'"));
            }
        }

        if let Some(format) = lookup(LOG_FORMAT_ENV).filter(|v| !v.trim().is_empty()) {
            match format.parse::<LogFormat>() {
                Ok(format) => config.format = format,
                Err(e) => config
                    .warnings
                    .push(format!("invalid {LOG_FORMAT_ENV}: {e}, using pretty output")),
            }
        }

        config
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Errors from installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// A global subscriber was already set.
    #[error("Failed to initialize logging: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let registry = tracing_subscriber::registry().with(config.filter());
    match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
    }

    for warning in &config.warnings {
        warn!("{warning}");
    }
    Ok(())
}
