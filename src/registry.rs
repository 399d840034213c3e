//! # Registry Classification
//!
//! Works out which ECR token API serves a registry address.
//!
//! See the Repository `registryId` and RegistryAlias `name` patterns in the
//! Amazon ECR and ECR Public API references for where the expressions come from.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PRIVATE_ECR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<account_id>[0-9]{12})\.dkr\.ecr\..*\.amazonaws\.com$")
        .expect("invalid private ECR pattern")
});

static PUBLIC_ECR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^public\.ecr\.aws/[a-z][a-z0-9]+(?:[._-][a-z0-9]+)*$")
        .expect("invalid public ECR pattern")
});

/// Kind of registry a Zarf registry address points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryKind {
    /// `<account>.dkr.ecr.<region>.amazonaws.com`
    PrivateEcr { account_id: String },
    /// `public.ecr.aws/<alias>`
    PublicEcr,
    /// Anything else; tokens are requested from private ECR
    Other,
}

impl RegistryKind {
    #[must_use]
    pub fn classify(address: &str) -> Self {
        if let Some(caps) = PRIVATE_ECR_URL.captures(address) {
            return RegistryKind::PrivateEcr {
                account_id: caps["account_id"].to_string(),
            };
        }
        if PUBLIC_ECR_URL.is_match(address) {
            return RegistryKind::PublicEcr;
        }
        RegistryKind::Other
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, RegistryKind::PublicEcr)
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::PrivateEcr { account_id } => write!(f, "private ECR (account {account_id})"),
            RegistryKind::PublicEcr => write!(f, "public ECR"),
            RegistryKind::Other => write!(f, "non-ECR registry"),
        }
    }
}
