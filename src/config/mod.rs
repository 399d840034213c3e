//! # Configuration
//!
//! Run settings loaded from environment variables.
//!
//! - `rotation`: names, labels and policies driving the rotation
//! - `logging`: log level and output format
//!
//! Every loader takes a lookup function so tests can supply a map instead of
//! mutating the process environment.

mod logging;
mod rotation;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use rotation::{LookupFailurePolicy, RotationConfig, SecretRef};

/// Read a variable as a string or return default
fn var_or_default_str<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Read a variable as boolean or return default
fn var_or_default_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            let v_lower = v.to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

/// Read a variable, treating empty or whitespace-only values as unset
fn var_non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Process environment lookup
fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
