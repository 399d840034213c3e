//! # Token Providers
//!
//! Abstract interface for registry token services.
//!
//! A [`TokenProviderFactory`] opens a session for a region and registry kind, and the
//! resulting [`TokenProvider`] issues exactly one authorization token per call.
//! Tokens are opaque: they are never decoded or inspected, only copied into the
//! credential document.

pub mod aws;

use crate::error::RotationError;
use crate::registry::RegistryKind;
use async_trait::async_trait;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque, short-lived registry authorization token
///
/// The value is wiped from memory when dropped and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw token value
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&"***").finish()
    }
}

/// A session with a registry token service
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Request a single authorization token
    async fn fetch_token(&self) -> Result<AuthToken, RotationError>;
}

/// Opens token service sessions
#[async_trait]
pub trait TokenProviderFactory: Send + Sync {
    /// Establish a session for the given region and registry kind
    async fn connect(
        &self,
        region: &str,
        registry: &RegistryKind,
    ) -> Result<Box<dyn TokenProvider>, RotationError>;
}

/// Pick the token out of a successful response
///
/// Token services answer with a list of authorization records; a successful call
/// that carries no record, or a first record without a token, issued nothing.
pub fn select_issued_token<I>(records: I) -> Result<AuthToken, RotationError>
where
    I: IntoIterator<Item = Option<String>>,
{
    records
        .into_iter()
        .next()
        .flatten()
        .map(AuthToken::new)
        .ok_or(RotationError::NoTokenIssued)
}
