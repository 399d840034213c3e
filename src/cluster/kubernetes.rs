//! # Kubernetes Cluster API
//!
//! `ClusterApi` implementation backed by a `kube::Client`.

use super::{ClusterApi, ClusterError};
use crate::error::RotationError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::{Api, ListParams, PostParams};
use kube::Client;
use tracing::debug;

/// Cluster access through the Kubernetes API server
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl std::fmt::Debug for KubeClusterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterApi").finish_non_exhaustive()
    }
}

impl KubeClusterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from in-cluster configuration, falling back to the local kubeconfig
    pub async fn try_default() -> Result<Self, RotationError> {
        let client = Client::try_default()
            .await
            .map_err(|e| RotationError::ClientSetup(e.to_string()))?;
        Ok(Self::new(client))
    }
}

/// Map a kube error, keeping 404 responses distinguishable from everything else
fn classify(error: kube::Error, kind: &str, name: &str) -> ClusterError {
    match error {
        kube::Error::Api(api_err) if api_err.code == 404 => ClusterError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        },
        other => ClusterError::Request(other.to_string()),
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .map_err(|e| classify(e, "Namespace", "*"))?;
        debug!("Listed {} namespaces", list.items.len());
        Ok(list.items)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secrets
            .get(name)
            .await
            .map_err(|e| classify(e, "Secret", &format!("{namespace}/{name}")))
    }

    async fn replace_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, ClusterError> {
        let name = secret
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| ClusterError::Request("secret has no metadata.name".to_string()))?;
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secrets
            .replace(name, &PostParams::default(), secret)
            .await
            .map_err(|e| classify(e, "Secret", &format!("{namespace}/{name}")))
    }
}
