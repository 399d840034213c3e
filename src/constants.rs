//! # Constants
//!
//! Well-known Zarf names used when nothing else is configured.
//!
//! These values are defaults only. [`crate::config::RotationConfig`] carries the
//! effective values through a run and can override each of them from the environment.

/// Namespace holding the Zarf state secret
pub const DEFAULT_ZARF_NAMESPACE: &str = "zarf";

/// Name of the secret holding serialized Zarf state
pub const DEFAULT_ZARF_STATE_SECRET: &str = "zarf-state";

/// Data key of the Zarf state secret holding the JSON state document
pub const DEFAULT_ZARF_STATE_KEY: &str = "state";

/// Image pull secret Zarf creates in every namespace it deploys into
pub const DEFAULT_IMAGE_PULL_SECRET: &str = "private-registry";

/// Data key of a `kubernetes.io/dockerconfigjson` secret
pub const DEFAULT_DOCKER_CONFIG_KEY: &str = ".dockerconfigjson";

/// Label marking a resource as owned by a tool
pub const DEFAULT_MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of the managed-by label for Zarf owned resources
pub const DEFAULT_MANAGED_BY_VALUE: &str = "zarf";

/// Namespace label controlling whether the Zarf agent acts in a namespace
pub const DEFAULT_AGENT_LABEL: &str = "zarf.dev/agent";

/// Agent label values that opt a namespace out
pub const DEFAULT_AGENT_OPT_OUT_VALUES: &[&str] = &["skip", "ignore"];

/// Environment variable holding the AWS region
pub const REGION_ENV_VAR: &str = "AWS_REGION";

/// ECR Public only issues authorization tokens from this region
pub const ECR_PUBLIC_TOKEN_REGION: &str = "us-east-1";

/// Default tracing filter when neither `RUST_LOG` nor `LOG_LEVEL` narrows it
pub const DEFAULT_LOG_FILTER_TARGET: &str = "ecr_credential_helper";
