//! # ECR Credential Helper
//!
//! A Kubernetes job that refreshes Zarf image pull secrets with a new Amazon ECR
//! authorization token.
//!
//! ## Overview
//!
//! ECR tokens expire after twelve hours, so the `private-registry` secrets Zarf
//! distributes into namespaces go stale unless something rewrites them. Run from a
//! CronJob, each invocation:
//!
//! 1. **Reads Zarf state** - Loads the registry address from the `zarf/zarf-state` secret
//! 2. **Fetches a token** - Calls `GetAuthorizationToken` once in `AWS_REGION`
//! 3. **Rotates secrets** - Rewrites `.dockerconfigjson` in every namespace whose secret
//!    is Zarf managed or whose namespace has not opted out of the Zarf agent
//!
//! The process exits 0 when every namespace was handled and 1 on any fatal error.

use anyhow::{Context, Result};
use ecr_credential_helper::config::{LoggingConfig, RotationConfig};
use ecr_credential_helper::prelude::*;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Required for rustls 0.23+ when no default provider is set via features.
    // Must happen before the kube or AWS clients build a TLS config.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider was already installed");
    }

    let logging = LoggingConfig::from_env();
    if let Err(e) = ecr_credential_helper::observability::init_tracing(&logging) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    info!("Starting ECR credential helper");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    match run().await {
        Ok(report) => {
            info!(
                "Updated {} image pull secret(s) for registry '{}'",
                report.rotated().count(),
                report.registry_address
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RotationReport> {
    let cluster = KubeClusterApi::try_default()
        .await
        .context("Failed to create Kubernetes clientset")?;

    let orchestrator = RotationOrchestrator::new(
        Arc::new(cluster),
        Arc::new(AwsTokenProviderFactory),
        RotationConfig::from_env(),
    );

    orchestrator
        .run()
        .await
        .context("Failed to update ECR image pull credentials")
}
