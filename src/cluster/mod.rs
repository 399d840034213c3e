//! # Cluster Access
//!
//! Minimal capability interface over the Kubernetes API.
//!
//! The rotation only needs to list namespaces and to get and replace secrets.
//! Keeping that surface behind a trait lets the rotation run against in-memory
//! fakes in tests; `KubeClusterApi` is the production implementation.

mod kubernetes;

pub use kubernetes::KubeClusterApi;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use thiserror::Error;

/// Failure of a single cluster API call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    /// The requested object does not exist (HTTP 404)
    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    /// Any other failure: authorization, conflict, transport, decoding
    #[error("{0}")]
    Request(String),
}

impl ClusterError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound { .. })
    }
}

/// Cluster operations the rotation depends on
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List every namespace in the cluster
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError>;

    /// Get a secret by namespace and name
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError>;

    /// Replace a secret with the given full object
    async fn replace_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, ClusterError>;
}
