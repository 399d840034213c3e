//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use ecr_credential_helper::prelude::*;
//! ```

pub use crate::cluster::{ClusterApi, ClusterError, KubeClusterApi};
pub use crate::config::{LoggingConfig, LookupFailurePolicy, RotationConfig, SecretRef};
pub use crate::error::RotationError;
pub use crate::provider::aws::AwsTokenProviderFactory;
pub use crate::provider::{AuthToken, TokenProvider, TokenProviderFactory};
pub use crate::registry::RegistryKind;
pub use crate::rotation::{
    AdmissionReason, NamespaceOutcome, RotationOrchestrator, RotationPhase, RotationReport,
};
pub use crate::state::ClusterState;
