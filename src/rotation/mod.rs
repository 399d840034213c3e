//! # Credential Rotation
//!
//! Refreshes Zarf image pull secrets with a new registry token.
//!
//! A run moves through `Init → StateLoaded → TokenAcquired → ScanningNamespaces → Done`.
//! The registry address and the token must both be in hand before any namespace is
//! touched. Namespaces are then processed one at a time in listing order:
//!
//! - no image pull secret: skipped silently
//! - lookup error other than not-found: handled per [`LookupFailurePolicy`]
//! - declined by [`policy::evaluate`]: left untouched
//! - encoding failure: logged, next namespace
//! - write-back failure: the run fails immediately
//!
//! There are no retries. A failed run is recovered by the next scheduled run.

pub mod encoder;
pub mod policy;

pub use encoder::{encode_docker_config, DockerConfig, DockerConfigAuth};
pub use policy::AdmissionReason;

use crate::cluster::ClusterApi;
use crate::config::{LookupFailurePolicy, RotationConfig};
use crate::constants::REGION_ENV_VAR;
use crate::error::RotationError;
use crate::provider::{AuthToken, TokenProviderFactory};
use crate::registry::RegistryKind;
use crate::state::{read_cluster_state, ClusterState};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Phase of a rotation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Init,
    StateLoaded,
    TokenAcquired,
    ScanningNamespaces,
    Done,
    Failed,
}

impl RotationPhase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationPhase::Init => "init",
            RotationPhase::StateLoaded => "state-loaded",
            RotationPhase::TokenAcquired => "token-acquired",
            RotationPhase::ScanningNamespaces => "scanning-namespaces",
            RotationPhase::Done => "done",
            RotationPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for RotationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened in one namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceOutcome {
    /// The secret was rewritten with the new token
    Rotated { reason: AdmissionReason },
    /// The namespace has no image pull secret
    NoCandidateSecret,
    /// Looking the secret up failed and the failure policy said to skip
    LookupFailed,
    /// The policy declined to touch the secret
    Declined,
    /// The credential document could not be serialized
    EncodingFailed,
    /// The listed namespace carried no name
    Unnamed,
}

/// Result of a run that reached `Done`
///
/// A run that ends in `Failed` returns the error instead; [`RotationError::phase`]
/// names the phase it failed in.
#[derive(Debug, Clone)]
pub struct RotationReport {
    pub registry_address: String,
    /// One entry per listed namespace, in listing order
    pub outcomes: Vec<(String, NamespaceOutcome)>,
}

impl RotationReport {
    /// Namespaces whose secret was rewritten
    pub fn rotated(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, NamespaceOutcome::Rotated { .. }))
            .map(|(name, _)| name.as_str())
    }

    /// Outcome for a namespace, if it was listed
    #[must_use]
    pub fn outcome(&self, namespace: &str) -> Option<NamespaceOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, outcome)| *outcome)
    }

    #[must_use]
    pub fn count(&self, wanted: fn(&NamespaceOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| wanted(o)).count()
    }
}

/// Runs credential rotation against a cluster and a token service
pub struct RotationOrchestrator {
    cluster: Arc<dyn ClusterApi>,
    tokens: Arc<dyn TokenProviderFactory>,
    config: RotationConfig,
}

impl fmt::Debug for RotationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn transition(phase: &mut RotationPhase, next: RotationPhase) {
    debug!("Rotation phase {} -> {}", phase, next);
    *phase = next;
}

impl RotationOrchestrator {
    pub fn new(
        cluster: Arc<dyn ClusterApi>,
        tokens: Arc<dyn TokenProviderFactory>,
        config: RotationConfig,
    ) -> Self {
        Self {
            cluster,
            tokens,
            config,
        }
    }

    /// Execute one rotation run
    pub async fn run(&self) -> Result<RotationReport, RotationError> {
        let span = info_span!("rotation.run", pull_secret = %self.config.pull_secret_name);
        async move {
            let mut phase = RotationPhase::Init;
            match self.run_phases(&mut phase).await {
                Ok(report) => Ok(report),
                Err(e) => {
                    error!("Rotation failed during phase '{}': {}", phase, e);
                    transition(&mut phase, RotationPhase::Failed);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_phases(&self, phase: &mut RotationPhase) -> Result<RotationReport, RotationError> {
        let state = read_cluster_state(self.cluster.as_ref(), &self.config).await?;
        transition(phase, RotationPhase::StateLoaded);

        let token = self.acquire_token(&state).await?;
        transition(phase, RotationPhase::TokenAcquired);

        let namespaces = self
            .cluster
            .list_namespaces()
            .await
            .map_err(RotationError::NamespaceListFailed)?;
        transition(phase, RotationPhase::ScanningNamespaces);

        let mut outcomes = Vec::with_capacity(namespaces.len());
        for namespace in &namespaces {
            let name = namespace.metadata.name.clone().unwrap_or_default();
            let outcome = self
                .process_namespace(namespace, &state, &token)
                .instrument(info_span!("rotation.namespace", namespace = %name))
                .await?;
            outcomes.push((name, outcome));
        }
        transition(phase, RotationPhase::Done);

        let report = RotationReport {
            registry_address: state.registry_address().to_string(),
            outcomes,
        };
        info!(
            "Rotation complete: {} rotated, {} without secret, {} declined, {} lookup failures skipped, {} encoding failures",
            report.count(|o| matches!(o, NamespaceOutcome::Rotated { .. })),
            report.count(|o| matches!(o, NamespaceOutcome::NoCandidateSecret)),
            report.count(|o| matches!(o, NamespaceOutcome::Declined)),
            report.count(|o| matches!(o, NamespaceOutcome::LookupFailed)),
            report.count(|o| matches!(o, NamespaceOutcome::EncodingFailed)),
        );
        Ok(report)
    }

    /// Resolve the region, open a token session and fetch exactly one token
    async fn acquire_token(&self, state: &ClusterState) -> Result<AuthToken, RotationError> {
        let region = self
            .config
            .region
            .as_deref()
            .ok_or_else(|| RotationError::ConfigMissing(REGION_ENV_VAR.to_string()))?;

        let registry = RegistryKind::classify(state.registry_address());
        debug!("Registry '{}' classified as {}", state.registry_address(), registry);

        let provider = self.tokens.connect(region, &registry).await?;
        let token = provider.fetch_token().await?;
        info!("Fetched registry authorization token for '{}'", state.registry_address());
        Ok(token)
    }

    /// Rotate the image pull secret of a single namespace
    ///
    /// Only lookup failures under [`LookupFailurePolicy::Abort`] and write-back
    /// failures are returned as errors; everything else is an outcome.
    async fn process_namespace(
        &self,
        namespace: &Namespace,
        state: &ClusterState,
        token: &AuthToken,
    ) -> Result<NamespaceOutcome, RotationError> {
        let Some(ns_name) = namespace.metadata.name.as_deref() else {
            warn!("Skipping namespace without a name");
            return Ok(NamespaceOutcome::Unnamed);
        };
        let secret_name = &self.config.pull_secret_name;

        let mut secret = match self.cluster.get_secret(ns_name, secret_name).await {
            Ok(secret) => secret,
            Err(e) if e.is_not_found() => {
                debug!("No secret '{}' in namespace '{}'", secret_name, ns_name);
                return Ok(NamespaceOutcome::NoCandidateSecret);
            }
            Err(source) => match self.config.lookup_failure_policy {
                LookupFailurePolicy::Abort => {
                    return Err(RotationError::SecretLookupFailed {
                        namespace: ns_name.to_string(),
                        name: secret_name.clone(),
                        source,
                    });
                }
                LookupFailurePolicy::Skip => {
                    warn!(
                        "Failed to get secret '{}' in namespace '{}', skipping: {}",
                        secret_name, ns_name, source
                    );
                    return Ok(NamespaceOutcome::LookupFailed);
                }
            },
        };

        let Some(reason) = policy::evaluate(namespace, &secret, &self.config) else {
            debug!(
                "Secret '{}' in namespace '{}' is not Zarf managed and the namespace opted out",
                secret_name, ns_name
            );
            return Ok(NamespaceOutcome::Declined);
        };

        let payload = match encode_docker_config(state.registry_address(), token) {
            Ok(payload) => payload,
            Err(source) => {
                let err = RotationError::EncodingFailed {
                    namespace: ns_name.to_string(),
                    name: secret_name.clone(),
                    source,
                };
                warn!("{}", err);
                return Ok(NamespaceOutcome::EncodingFailed);
            }
        };

        secret
            .data
            .get_or_insert_with(BTreeMap::new)
            .insert(self.config.docker_config_key.clone(), ByteString(payload));

        self.cluster
            .replace_secret(ns_name, &secret)
            .await
            .map_err(|source| RotationError::UpdateRejected {
                namespace: ns_name.to_string(),
                name: secret_name.clone(),
                source,
            })?;

        info!(
            "Successfully updated secret '{}' in namespace '{}' ({})",
            secret_name, ns_name, reason
        );
        Ok(NamespaceOutcome::Rotated { reason })
    }
}
