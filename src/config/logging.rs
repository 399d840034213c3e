//! # Logging Configuration
//!
//! Log level and output format for the job.

use super::{process_env, var_or_default_bool, var_or_default_str};
use std::str::FromStr;

/// Log level
///
/// Log levels follow standard hierarchy: DEBUG includes INFO and WARN, WARN includes ERROR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`
    #[must_use]
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "pretty" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Enable color in text format logs
    pub enable_color: bool,
}

impl LoggingConfig {
    /// Load configuration from process environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    /// Load configuration from an arbitrary variable lookup with defaults
    ///
    /// Unparseable values fall back to the default; the subscriber does not exist yet
    /// at this point so there is nobody to warn.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: var_or_default_str(&lookup, "LOG_LEVEL", "INFO")
                .parse()
                .unwrap_or_default(),
            format: var_or_default_str(&lookup, "LOG_FORMAT", "json")
                .parse()
                .unwrap_or_default(),
            enable_color: var_or_default_bool(&lookup, "LOG_ENABLE_COLOR", false),
        }
    }
}
