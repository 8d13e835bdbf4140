//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blog_core::ports::{AuthError, TokenClaims, TokenKind, TokenPair, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            issuer: "blog-api".to_string(),
            access_ttl_minutes: 5,
            refresh_ttl_hours: 24,
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("JWT_SECRET").unwrap_or(defaults.secret);

        // Warn if using default secret in production
        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_ttl_minutes: std::env::var("JWT_ACCESS_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_ttl_minutes),
            refresh_ttl_hours: std::env::var("JWT_REFRESH_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.refresh_ttl_hours),
        }
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    email: String,
    roles: Vec<String>,
    token_type: TokenKind,
    jti: String,
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

/// JWT-based token service issuing HS256 access/refresh tokens.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    fn lifetime(&self, kind: TokenKind) -> TimeDelta {
        match kind {
            TokenKind::Access => TimeDelta::minutes(self.config.access_ttl_minutes),
            TokenKind::Refresh => TimeDelta::hours(self.config.refresh_ttl_hours),
        }
    }

    fn sign(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
        kind: TokenKind,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + self.lifetime(kind);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles,
            token_type: kind,
            jti: Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue_pair(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<TokenPair, AuthError> {
        let refresh = self.sign(user_id, email, roles.clone(), TokenKind::Refresh)?;
        let access = self.sign(user_id, email, roles, TokenKind::Access)?;

        Ok(TokenPair { refresh, access })
    }

    fn access_from_refresh(&self, refresh: &TokenClaims) -> Result<String, AuthError> {
        if refresh.kind != TokenKind::Refresh {
            return Err(AuthError::WrongTokenType {
                expected: TokenKind::Refresh,
            });
        }
        self.sign(
            refresh.user_id,
            &refresh.email,
            refresh.roles.clone(),
            TokenKind::Access,
        )
    }

    fn validate_token(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = token_data.claims;
        if claims.token_type != kind {
            return Err(AuthError::WrongTokenType { expected: kind });
        }

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let jti =
            Uuid::parse_str(&claims.jti).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            email: claims.email,
            roles: claims.roles,
            kind: claims.token_type,
            jti,
            exp: claims.exp,
        })
    }
}
