//! # Zarf State
//!
//! Reads the registry address out of the Zarf state secret.
//!
//! Zarf persists its cluster state as a JSON document under the `state` key of the
//! `zarf/zarf-state` secret. Only the registry section matters here; every other
//! field of the document is ignored.

use crate::cluster::ClusterApi;
use crate::config::RotationConfig;
use crate::error::RotationError;
use serde::Deserialize;
use tracing::{debug, warn};

/// Information about the container registry Zarf is configured to use
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryInfo {
    /// URL address of the registry
    pub address: String,
    /// Indicates if Zarf is directly managing the registry inside the cluster
    #[serde(default)]
    pub internal_registry: bool,
}

/// The subset of Zarf state this job reads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterState {
    pub registry_info: RegistryInfo,
}

impl ClusterState {
    /// Registry address the credential document is keyed by
    #[must_use]
    pub fn registry_address(&self) -> &str {
        &self.registry_info.address
    }
}

/// Parse the raw state payload
pub fn parse_cluster_state(payload: &[u8], config: &RotationConfig) -> Result<ClusterState, RotationError> {
    serde_json::from_slice(payload).map_err(|e| RotationError::StateMalformed {
        name: config.state_secret.name.clone(),
        key: config.state_key.clone(),
        reason: e.to_string(),
    })
}

/// Fetch the state secret and deserialize its payload
pub async fn read_cluster_state(
    cluster: &dyn ClusterApi,
    config: &RotationConfig,
) -> Result<ClusterState, RotationError> {
    let target = &config.state_secret;
    let secret = cluster
        .get_secret(&target.namespace, &target.name)
        .await
        .map_err(|source| RotationError::StateUnavailable {
            namespace: target.namespace.clone(),
            name: target.name.clone(),
            source,
        })?;

    let payload = secret
        .data
        .as_ref()
        .and_then(|data| data.get(&config.state_key))
        .ok_or_else(|| RotationError::StateMalformed {
            name: target.name.clone(),
            key: config.state_key.clone(),
            reason: "key is missing".to_string(),
        })?;

    let state = parse_cluster_state(&payload.0, config)?;

    if state.registry_info.internal_registry {
        warn!(
            "Zarf is configured to use an internal registry at '{}'; an ECR token may not apply",
            state.registry_address()
        );
    }
    debug!("Loaded registry address '{}' from secret '{}'", state.registry_address(), target);

    Ok(state)
}
