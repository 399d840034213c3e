//! # Rotation Configuration
//!
//! Names, labels and policies the rotation works with.

use super::{process_env, var_non_empty, var_or_default_str};
use crate::constants::*;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Reference to a secret by namespace and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// What to do when looking up the image pull secret fails for a reason other than not-found
///
/// Not-found is never subject to this policy; a namespace without the secret is always skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupFailurePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log a warning and move on to the next namespace
    Skip,
}

impl FromStr for LookupFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(LookupFailurePolicy::Abort),
            "skip" => Ok(LookupFailurePolicy::Skip),
            other => Err(format!(
                "unknown lookup failure policy '{other}', expected 'abort' or 'skip'"
            )),
        }
    }
}

/// Configuration for one rotation run
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Secret holding the serialized Zarf state
    pub state_secret: SecretRef,
    /// Data key of the state secret holding the JSON document
    pub state_key: String,
    /// Name of the image pull secret looked up in every namespace
    pub pull_secret_name: String,
    /// Data key the credential document is written to
    pub docker_config_key: String,
    /// Label key marking a secret as owned
    pub managed_by_label: String,
    /// Label value marking a secret as owned by Zarf
    pub managed_by_value: String,
    /// Namespace label key the agent opt-out is read from
    pub agent_label: String,
    /// Agent label values that opt a namespace out
    pub agent_opt_out_values: Vec<String>,
    /// AWS region, required before a token is requested
    pub region: Option<String>,
    /// Handling of non-not-found lookup failures
    pub lookup_failure_policy: LookupFailurePolicy,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            state_secret: SecretRef {
                namespace: DEFAULT_ZARF_NAMESPACE.to_string(),
                name: DEFAULT_ZARF_STATE_SECRET.to_string(),
            },
            state_key: DEFAULT_ZARF_STATE_KEY.to_string(),
            pull_secret_name: DEFAULT_IMAGE_PULL_SECRET.to_string(),
            docker_config_key: DEFAULT_DOCKER_CONFIG_KEY.to_string(),
            managed_by_label: DEFAULT_MANAGED_BY_LABEL.to_string(),
            managed_by_value: DEFAULT_MANAGED_BY_VALUE.to_string(),
            agent_label: DEFAULT_AGENT_LABEL.to_string(),
            agent_opt_out_values: DEFAULT_AGENT_OPT_OUT_VALUES
                .iter()
                .map(ToString::to_string)
                .collect(),
            region: None,
            lookup_failure_policy: LookupFailurePolicy::default(),
        }
    }
}

impl RotationConfig {
    /// Load configuration from process environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    /// Load configuration from an arbitrary variable lookup with defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let agent_opt_out_values = var_non_empty(&lookup, "AGENT_OPT_OUT_VALUES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_else(|| {
                DEFAULT_AGENT_OPT_OUT_VALUES
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            });

        let lookup_failure_policy = match var_non_empty(&lookup, "SECRET_LOOKUP_FAILURE_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                warn!("{}, falling back to 'abort'", e);
                LookupFailurePolicy::Abort
            }),
            None => LookupFailurePolicy::default(),
        };

        Self {
            state_secret: SecretRef {
                namespace: var_or_default_str(&lookup, "ZARF_NAMESPACE", DEFAULT_ZARF_NAMESPACE),
                name: var_or_default_str(&lookup, "ZARF_STATE_SECRET", DEFAULT_ZARF_STATE_SECRET),
            },
            state_key: var_or_default_str(&lookup, "ZARF_STATE_KEY", DEFAULT_ZARF_STATE_KEY),
            pull_secret_name: var_or_default_str(
                &lookup,
                "IMAGE_PULL_SECRET",
                DEFAULT_IMAGE_PULL_SECRET,
            ),
            docker_config_key: var_or_default_str(
                &lookup,
                "DOCKER_CONFIG_KEY",
                DEFAULT_DOCKER_CONFIG_KEY,
            ),
            managed_by_label: var_or_default_str(
                &lookup,
                "MANAGED_BY_LABEL",
                DEFAULT_MANAGED_BY_LABEL,
            ),
            managed_by_value: var_or_default_str(
                &lookup,
                "MANAGED_BY_VALUE",
                DEFAULT_MANAGED_BY_VALUE,
            ),
            agent_label: var_or_default_str(&lookup, "AGENT_LABEL", DEFAULT_AGENT_LABEL),
            agent_opt_out_values,
            region: var_non_empty(&lookup, REGION_ENV_VAR),
            lookup_failure_policy,
        }
    }

    /// Builder-style override of the region, mostly for tests
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
