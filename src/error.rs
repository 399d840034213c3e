//! # Errors
//!
//! Error types for a credential rotation run.

use crate::cluster::ClusterError;
use crate::rotation::RotationPhase;
use thiserror::Error;

/// Everything that can go wrong during a rotation run
///
/// All variants except [`RotationError::EncodingFailed`] abort the run.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("Failed to create Kubernetes client: {0}")]
    ClientSetup(String),

    #[error("Failed to get secret '{name}' in namespace '{namespace}': {source}")]
    StateUnavailable {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("Failed to parse 'data.{key}' from the '{name}' secret: {reason}")]
    StateMalformed {
        name: String,
        key: String,
        reason: String,
    },

    #[error("{0} environment variable is not set")]
    ConfigMissing(String),

    #[error("Failed to create AWS session: {0}")]
    SessionError(String),

    #[error("Error calling GetAuthorizationToken(): {0}")]
    TokenRequestFailed(String),

    #[error("No authorization data received")]
    NoTokenIssued,

    #[error("Error listing namespaces: {0}")]
    NamespaceListFailed(#[source] ClusterError),

    #[error("Failed to get secret '{name}' in namespace '{namespace}': {source}")]
    SecretLookupFailed {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("Failed to marshal docker config data for secret '{name}' in namespace '{namespace}': {source}")]
    EncodingFailed {
        namespace: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to update secret '{name}' in namespace '{namespace}': {source}")]
    UpdateRejected {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },
}

impl RotationError {
    /// Phase the run was in when this error was raised
    #[must_use]
    pub fn phase(&self) -> RotationPhase {
        match self {
            RotationError::ClientSetup(_)
            | RotationError::StateUnavailable { .. }
            | RotationError::StateMalformed { .. } => RotationPhase::Init,
            RotationError::ConfigMissing(_)
            | RotationError::SessionError(_)
            | RotationError::TokenRequestFailed(_)
            | RotationError::NoTokenIssued => RotationPhase::StateLoaded,
            RotationError::NamespaceListFailed(_) => RotationPhase::TokenAcquired,
            RotationError::SecretLookupFailed { .. }
            | RotationError::EncodingFailed { .. }
            | RotationError::UpdateRejected { .. } => RotationPhase::ScanningNamespaces,
        }
    }

    /// Whether this error ends the run
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RotationError::EncodingFailed { .. })
    }
}
