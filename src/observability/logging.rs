//! # Logging
//!
//! Tracing subscriber setup for the job.
//!
//! `RUST_LOG` takes precedence when set. Otherwise the configured level applies to
//! this crate and everything else logs at `warn`, which keeps the AWS SDK and kube
//! client quiet unless asked.

use crate::config::{LogFormat, LoggingConfig};
use crate::constants::DEFAULT_LOG_FILTER_TARGET;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
#[must_use]
pub fn default_filter(config: &LoggingConfig) -> String {
    format!(
        "warn,{}={}",
        DEFAULT_LOG_FILTER_TARGET,
        config.level.as_directive()
    )
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        LogFormat::Text => builder.with_ansi(config.enable_color).try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
