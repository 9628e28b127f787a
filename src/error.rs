// ABOUTME: Error kinds for secret store access and connection resolution
// ABOUTME: Store failures are translated once, at the resolver boundary

use thiserror::Error;

/// Failures reported by a secret store backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Secret store unavailable: {0}")]
    Unavailable(String),
    #[error("Secret store access denied: {0}")]
    AccessDenied(String),
    #[error("No secret stored for service '{service}' and account '{account}'")]
    NotFound { service: String, account: String },
}

/// Failures reported by the resolver and the descriptor builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Secret store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Secret store access denied: {0}")]
    StoreAccessDenied(String),
    #[error("No credential provisioned for service '{service}' and account '{account}'")]
    CredentialMissing { service: String, account: String },
    #[error("Invalid connection parameters: {0}")]
    InvalidParams(String),
}

impl ResolveError {
    /// Only an unreachable store is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::StoreUnavailable(_))
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ResolveError::StoreUnavailable(msg),
            StoreError::AccessDenied(msg) => ResolveError::StoreAccessDenied(msg),
            StoreError::NotFound { service, account } => {
                ResolveError::CredentialMissing { service, account }
            }
        }
    }
}
