//! # Secret Policy
//!
//! Decides whether an image pull secret may be rotated.
//!
//! Two independent admission paths exist. A secret labelled as managed by Zarf is
//! always rotated. Any other secret is rotated unless its namespace opted out of
//! the Zarf agent.

use crate::config::RotationConfig;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use std::collections::BTreeMap;
use std::fmt;

/// Why a secret was admitted for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionReason {
    /// The secret carries the managed-by label with the Zarf value
    ManagedBySystem,
    /// The namespace has not opted out of the agent
    NamespaceNotOptedOut,
}

impl AdmissionReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionReason::ManagedBySystem => "managed-by-system",
            AdmissionReason::NamespaceNotOptedOut => "namespace-not-opted-out",
        }
    }
}

impl fmt::Display for AdmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn label<'a>(labels: Option<&'a BTreeMap<String, String>>, key: &str) -> Option<&'a str> {
    labels.and_then(|l| l.get(key)).map(String::as_str)
}

/// Evaluate the policy for one namespace/secret pair
///
/// Returns `None` when the secret must be left untouched.
pub fn evaluate(
    namespace: &Namespace,
    secret: &Secret,
    config: &RotationConfig,
) -> Option<AdmissionReason> {
    let managed_by = label(secret.metadata.labels.as_ref(), &config.managed_by_label);
    if managed_by == Some(config.managed_by_value.as_str()) {
        return Some(AdmissionReason::ManagedBySystem);
    }

    let agent = label(namespace.metadata.labels.as_ref(), &config.agent_label);
    let opted_out = agent.is_some_and(|value| config.agent_opt_out_values.iter().any(|v| v == value));
    if opted_out {
        None
    } else {
        Some(AdmissionReason::NamespaceNotOptedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn namespace(agent: Option<&str>) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some("apps".to_string()),
                labels: agent.map(|v| BTreeMap::from([("zarf.dev/agent".to_string(), v.to_string())])),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn secret(managed_by: Option<&str>) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some("private-registry".to_string()),
                namespace: Some("apps".to_string()),
                labels: managed_by.map(|v| {
                    BTreeMap::from([("app.kubernetes.io/managed-by".to_string(), v.to_string())])
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_managed_secret_is_rotated_regardless_of_opt_out() {
        let config = RotationConfig::default();
        for agent in [None, Some("skip"), Some("ignore"), Some("mutate")] {
            assert_eq!(
                evaluate(&namespace(agent), &secret(Some("zarf")), &config),
                Some(AdmissionReason::ManagedBySystem),
                "agent label {agent:?}"
            );
        }
    }

    #[test]
    fn test_unlabelled_secret_in_opted_out_namespace_is_left_alone() {
        let config = RotationConfig::default();
        assert_eq!(evaluate(&namespace(Some("skip")), &secret(None), &config), None);
        assert_eq!(evaluate(&namespace(Some("ignore")), &secret(None), &config), None);
        assert_eq!(evaluate(&namespace(Some("skip")), &secret(Some("helm")), &config), None);
    }

    #[test]
    fn test_unlabelled_secret_in_participating_namespace_is_rotated() {
        let config = RotationConfig::default();
        assert_eq!(
            evaluate(&namespace(None), &secret(None), &config),
            Some(AdmissionReason::NamespaceNotOptedOut)
        );
        assert_eq!(
            evaluate(&namespace(Some("mutate")), &secret(Some("helm")), &config),
            Some(AdmissionReason::NamespaceNotOptedOut)
        );
    }

    #[test]
    fn test_opt_out_values_are_configurable() {
        let config = RotationConfig {
            agent_opt_out_values: vec!["off".to_string()],
            ..RotationConfig::default()
        };
        assert_eq!(evaluate(&namespace(Some("off")), &secret(None), &config), None);
        assert_eq!(
            evaluate(&namespace(Some("skip")), &secret(None), &config),
            Some(AdmissionReason::NamespaceNotOptedOut)
        );
    }
}
