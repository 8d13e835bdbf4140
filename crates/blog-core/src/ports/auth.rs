//! Authentication ports: tokens and password hashing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two JWT flavours a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer credential for protected endpoints.
    Access,
    /// Long-lived credential that mints access tokens and can be blacklisted.
    Refresh,
}

/// Claims stored in JWT tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub kind: TokenKind,
    /// Unique token id, the blacklist key.
    pub jti: Uuid,
    pub exp: i64,
}

impl TokenClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// A freshly issued refresh token and the access token derived from it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a refresh token and a matching access token for a user.
    fn issue_pair(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<TokenPair, AuthError>;

    /// Mint a new access token from already validated refresh claims.
    fn access_from_refresh(&self, refresh: &TokenClaims) -> Result<String, AuthError>;

    /// Validate and decode a token, requiring it to be of the given kind.
    fn validate_token(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Spend the cost of one verification for a login naming an unknown account.
    fn verify_decoy(&self, _password: &str) {}
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Expected {expected:?} token")]
    WrongTokenType { expected: TokenKind },

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
