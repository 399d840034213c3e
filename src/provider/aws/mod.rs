//! # Amazon ECR Token Providers
//!
//! Token providers for Amazon ECR and ECR Public.
//!
//! Both call `GetAuthorizationToken` exactly once per fetch. The returned token is
//! the base64 `AWS:<password>` pair Docker expects in the `auth` field of a
//! credential document, so it is passed through untouched.

mod auth;

pub use auth::create_sdk_config;

use crate::constants::ECR_PUBLIC_TOKEN_REGION;
use crate::error::RotationError;
use crate::provider::{select_issued_token, AuthToken, TokenProvider, TokenProviderFactory};
use crate::registry::RegistryKind;
use async_trait::async_trait;
use tracing::{info, info_span, warn, Instrument};

/// Private ECR token provider
pub struct EcrTokenProvider {
    client: aws_sdk_ecr::Client,
    region: String,
}

impl std::fmt::Debug for EcrTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcrTokenProvider")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl EcrTokenProvider {
    pub async fn new(region: &str) -> Result<Self, RotationError> {
        let sdk_config = create_sdk_config(region).await?;
        Ok(Self {
            client: aws_sdk_ecr::Client::new(&sdk_config),
            region: region.to_string(),
        })
    }
}

#[async_trait]
impl TokenProvider for EcrTokenProvider {
    async fn fetch_token(&self) -> Result<AuthToken, RotationError> {
        let span = info_span!("ecr.get_authorization_token", region = %self.region);
        async move {
            let output = self
                .client
                .get_authorization_token()
                .send()
                .await
                .map_err(|e| {
                    RotationError::TokenRequestFailed(
                        aws_sdk_ecr::error::DisplayErrorContext(&e).to_string(),
                    )
                })?;

            select_issued_token(
                output
                    .authorization_data()
                    .iter()
                    .map(|data| data.authorization_token().map(ToString::to_string)),
            )
        }
        .instrument(span)
        .await
    }
}

/// ECR Public token provider
pub struct EcrPublicTokenProvider {
    client: aws_sdk_ecrpublic::Client,
}

impl std::fmt::Debug for EcrPublicTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcrPublicTokenProvider").finish_non_exhaustive()
    }
}

impl EcrPublicTokenProvider {
    /// ECR Public only serves `GetAuthorizationToken` from us-east-1, whatever region
    /// the registry was configured with.
    pub async fn new() -> Result<Self, RotationError> {
        let sdk_config = create_sdk_config(ECR_PUBLIC_TOKEN_REGION).await?;
        Ok(Self {
            client: aws_sdk_ecrpublic::Client::new(&sdk_config),
        })
    }
}

#[async_trait]
impl TokenProvider for EcrPublicTokenProvider {
    async fn fetch_token(&self) -> Result<AuthToken, RotationError> {
        let span = info_span!("ecr_public.get_authorization_token");
        async move {
            let output = self
                .client
                .get_authorization_token()
                .send()
                .await
                .map_err(|e| {
                    RotationError::TokenRequestFailed(
                        aws_sdk_ecrpublic::error::DisplayErrorContext(&e).to_string(),
                    )
                })?;

            select_issued_token(
                output
                    .authorization_data()
                    .map(|data| data.authorization_token().map(ToString::to_string)),
            )
        }
        .instrument(span)
        .await
    }
}

/// Opens ECR sessions, picking the token API that serves the registry
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsTokenProviderFactory;

#[async_trait]
impl TokenProviderFactory for AwsTokenProviderFactory {
    async fn connect(
        &self,
        region: &str,
        registry: &RegistryKind,
    ) -> Result<Box<dyn TokenProvider>, RotationError> {
        if registry.is_public() {
            if region != ECR_PUBLIC_TOKEN_REGION {
                info!(
                    "Registry is public ECR, requesting token from {} instead of {}",
                    ECR_PUBLIC_TOKEN_REGION, region
                );
            }
            return Ok(Box::new(EcrPublicTokenProvider::new().await?));
        }

        match registry {
            RegistryKind::PrivateEcr { account_id } => {
                info!("Registry is private ECR in account {}", account_id);
            }
            _ => {
                warn!("Registry address is not an ECR URL, requesting a private ECR token anyway");
            }
        }
        Ok(Box::new(EcrTokenProvider::new(region).await?))
    }
}
