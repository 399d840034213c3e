//! # AWS Session
//!
//! Builds the AWS SDK configuration the ECR clients are created from.

use crate::error::RotationError;
use aws_config::SdkConfig;
use tracing::{debug, info};

/// Create AWS SDK config using the default credential chain
///
/// The default chain covers IRSA (IAM Roles for Service Accounts): when the pod's
/// service account carries the `eks.amazonaws.com/role-arn` annotation the SDK
/// picks up the web identity token on its own. Environment credentials and shared
/// profiles work the same way outside a cluster.
pub async fn create_sdk_config(region: &str) -> Result<SdkConfig, RotationError> {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await;

    if sdk_config.credentials_provider().is_none() {
        return Err(RotationError::SessionError(format!(
            "no AWS credentials provider could be configured for region '{region}'"
        )));
    }

    debug!("AWS SDK config loaded for region '{}'", region);
    info!("Using the default AWS credential chain (IRSA, environment, profile)");

    Ok(sdk_config)
}
