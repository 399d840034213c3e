//! Common test utilities for rotation tests
//!
//! In-memory stand-ins for the Kubernetes API and the ECR token service. Both
//! record every call so tests can assert on ordering as well as on end state.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use ecr_credential_helper::cluster::{ClusterApi, ClusterError};
use ecr_credential_helper::error::RotationError;
use ecr_credential_helper::provider::{AuthToken, TokenProvider, TokenProviderFactory};
use ecr_credential_helper::registry::RegistryKind;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, Once};

static TRACING_INIT: Once = Once::new();

/// Route tracing output through the test harness so failing tests show logs
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("ecr_credential_helper=debug")
            .with_test_writer()
            .try_init();
    });
}

pub const REGISTRY: &str = "example.com/registry";
pub const TOKEN: &str = "dG9rZW4=";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn namespace(name: &str, agent: Option<&str>) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: agent.map(|v| BTreeMap::from([("zarf.dev/agent".to_string(), v.to_string())])),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn pull_secret(namespace: &str, managed_by: Option<&str>, docker_config: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some("private-registry".to_string()),
            namespace: Some(namespace.to_string()),
            labels: managed_by.map(|v| {
                BTreeMap::from([("app.kubernetes.io/managed-by".to_string(), v.to_string())])
            }),
            ..Default::default()
        },
        type_: Some("kubernetes.io/dockerconfigjson".to_string()),
        data: Some(BTreeMap::from([(
            ".dockerconfigjson".to_string(),
            ByteString(docker_config.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

pub fn state_secret_with_payload(payload: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some("zarf-state".to_string()),
            namespace: Some("zarf".to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            "state".to_string(),
            ByteString(payload.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

pub fn state_secret(address: &str) -> Secret {
    state_secret_with_payload(&format!(
        r#"{{"distro":"eks","registryInfo":{{"address":"{address}","internalRegistry":false}}}}"#
    ))
}

pub const STALE_DOCKER_CONFIG: &str = r#"{"auths":{"example.com/registry":{"auth":"c3RhbGU="}}}"#;

// ---------------------------------------------------------------------------
// Fake cluster
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FakeCluster {
    namespaces: Vec<Namespace>,
    list_error: Option<ClusterError>,
    lookup_errors: BTreeMap<(String, String), ClusterError>,
    rejected_updates: BTreeSet<String>,
    secrets: Mutex<BTreeMap<(String, String), Secret>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.secrets.lock().unwrap().insert(key, secret);
        self
    }

    pub fn with_list_error(mut self, error: ClusterError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn with_lookup_error(mut self, namespace: &str, name: &str, error: ClusterError) -> Self {
        self.lookup_errors
            .insert((namespace.to_string(), name.to_string()), error);
        self
    }

    pub fn rejecting_updates_in(mut self, namespace: &str) -> Self {
        self.rejected_updates.insert(namespace.to_string());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Raw `.dockerconfigjson` bytes of a namespace's pull secret
    pub fn docker_config(&self, namespace: &str) -> Option<Vec<u8>> {
        self.secret(namespace, "private-registry")
            .and_then(|s| s.data)
            .and_then(|d| d.get(".dockerconfigjson").map(|b| b.0.clone()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replaced(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("replace ").map(ToString::to_string))
            .collect()
    }

    pub fn listed_namespaces(&self) -> bool {
        self.calls().iter().any(|c| c == "list namespaces")
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        self.record("list namespaces".to_string());
        match &self.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.namespaces.clone()),
        }
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError> {
        self.record(format!("get {namespace}/{name}"));
        let key = (namespace.to_string(), name.to_string());
        if let Some(error) = self.lookup_errors.get(&key) {
            return Err(error.clone());
        }
        self.secrets
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "Secret".to_string(),
                name: format!("{namespace}/{name}"),
            })
    }

    async fn replace_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, ClusterError> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        self.record(format!("replace {namespace}/{name}"));
        if self.rejected_updates.contains(namespace) {
            return Err(ClusterError::Request(
                "secrets \"private-registry\" is forbidden".to_string(),
            ));
        }
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name), secret.clone());
        Ok(secret.clone())
    }
}

// ---------------------------------------------------------------------------
// Fake token service
// ---------------------------------------------------------------------------

/// How the fake token service answers
#[derive(Debug, Clone)]
pub enum TokenBehavior {
    Issue(String),
    SessionFails,
    RequestFails,
    IssueNothing,
}

#[derive(Debug)]
pub struct FakeTokenFactory {
    behavior: TokenBehavior,
    connects: Arc<Mutex<Vec<(String, RegistryKind)>>>,
    fetches: Arc<Mutex<usize>>,
}

impl FakeTokenFactory {
    pub fn issuing(token: &str) -> Self {
        Self::with_behavior(TokenBehavior::Issue(token.to_string()))
    }

    pub fn with_behavior(behavior: TokenBehavior) -> Self {
        Self {
            behavior,
            connects: Arc::default(),
            fetches: Arc::default(),
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Regions and registry kinds sessions were opened for
    pub fn connects(&self) -> Vec<(String, RegistryKind)> {
        self.connects.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

struct FakeTokenProvider {
    behavior: TokenBehavior,
    fetches: Arc<Mutex<usize>>,
}

#[async_trait]
impl TokenProvider for FakeTokenProvider {
    async fn fetch_token(&self) -> Result<AuthToken, RotationError> {
        *self.fetches.lock().unwrap() += 1;
        match &self.behavior {
            TokenBehavior::Issue(token) => Ok(AuthToken::new(token.clone())),
            TokenBehavior::RequestFails => Err(RotationError::TokenRequestFailed(
                "AccessDeniedException: not authorized to perform ecr:GetAuthorizationToken"
                    .to_string(),
            )),
            TokenBehavior::IssueNothing => {
                ecr_credential_helper::provider::select_issued_token(Vec::<Option<String>>::new())
            }
            TokenBehavior::SessionFails => unreachable!("session never opened"),
        }
    }
}

#[async_trait]
impl TokenProviderFactory for FakeTokenFactory {
    async fn connect(
        &self,
        region: &str,
        registry: &RegistryKind,
    ) -> Result<Box<dyn TokenProvider>, RotationError> {
        self.connects
            .lock()
            .unwrap()
            .push((region.to_string(), registry.clone()));
        if matches!(self.behavior, TokenBehavior::SessionFails) {
            return Err(RotationError::SessionError(
                "no AWS credentials provider could be configured".to_string(),
            ));
        }
        Ok(Box::new(FakeTokenProvider {
            behavior: self.behavior.clone(),
            fetches: Arc::clone(&self.fetches),
        }))
    }
}
