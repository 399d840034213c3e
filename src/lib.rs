//! ECR Credential Helper Library
//!
//! Refreshes Zarf image pull secrets with short-lived Amazon ECR authorization tokens.
//!
//! The binary wires the production adapters together; the library exposes every
//! piece so the rotation can be driven against in-memory fakes in tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecr_credential_helper::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), RotationError> {
//! let cluster = Arc::new(KubeClusterApi::try_default().await?);
//! let orchestrator = RotationOrchestrator::new(
//!     cluster,
//!     Arc::new(AwsTokenProviderFactory),
//!     RotationConfig::from_env(),
//! );
//! let report = orchestrator.run().await?;
//! # let _ = report;
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod rotation;
pub mod state;
