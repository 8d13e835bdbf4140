//! Refresh token blacklist port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::AuthError;

/// Store of revoked refresh token ids.
///
/// Entries only need to outlive the token they revoke; backends may drop
/// them after `expires_at`.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Revoke a token id. Fails with [`BlacklistError::AlreadyBlacklisted`]
    /// if it was revoked before.
    async fn blacklist(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), BlacklistError>;

    /// Check whether a token id has been revoked.
    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool, BlacklistError>;
}

/// Blacklist backend errors.
#[derive(Debug, thiserror::Error)]
pub enum BlacklistError {
    #[error("Token is already blacklisted")]
    AlreadyBlacklisted,

    #[error("Blacklist store unavailable: {0}")]
    Unavailable(String),
}

/// Why a logout request was refused.
#[derive(Debug, thiserror::Error)]
pub enum LogoutError {
    /// Missing, undecodable, expired, or not a refresh token.
    #[error("Token is invalid or expired")]
    TokenMalformed(#[source] AuthError),

    #[error("Token is blacklisted")]
    TokenAlreadyBlacklisted,

    #[error("Token store unavailable")]
    TokenStoreUnavailable(String),
}

impl From<AuthError> for LogoutError {
    fn from(err: AuthError) -> Self {
        LogoutError::TokenMalformed(err)
    }
}

impl From<BlacklistError> for LogoutError {
    fn from(err: BlacklistError) -> Self {
        match err {
            BlacklistError::AlreadyBlacklisted => LogoutError::TokenAlreadyBlacklisted,
            BlacklistError::Unavailable(msg) => LogoutError::TokenStoreUnavailable(msg),
        }
    }
}
