//! # Credential Encoder
//!
//! Renders the `.dockerconfigjson` document for a registry and token.

use crate::provider::AuthToken;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Credentials for a single registry host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfigAuth {
    pub auth: String,
}

/// Docker config document as stored in `kubernetes.io/dockerconfigjson` secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfig {
    pub auths: BTreeMap<String, DockerConfigAuth>,
}

impl DockerConfig {
    /// Document with exactly one entry for the registry
    pub fn for_registry(registry_address: &str, token: &AuthToken) -> Self {
        Self {
            auths: BTreeMap::from([(
                registry_address.to_string(),
                DockerConfigAuth {
                    auth: token.expose().to_string(),
                },
            )]),
        }
    }
}

/// Serialize the credential document for the registry
pub fn encode_docker_config(
    registry_address: &str,
    token: &AuthToken,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&DockerConfig::for_registry(registry_address, token))
}
