//! Redis token blacklist, shared by every API instance.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ExistenceCheck, SetExpiry, SetOptions};
use uuid::Uuid;

use blog_core::ports::{BlacklistError, TokenBlacklist};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prefix for blacklist keys
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "blog:blacklist:".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables; `None` when `REDIS_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REDIS_URL").ok()?;
        let defaults = Self::default();

        Some(Self {
            url,
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: defaults.key_prefix,
        })
    }
}

/// Redis-backed blacklist. Each revoked token id is a key expiring with the token.
pub struct RedisTokenBlacklist {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisTokenBlacklist {
    pub async fn new(config: RedisConfig) -> Result<Self, BlacklistError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| BlacklistError::Unavailable(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| BlacklistError::Unavailable("Connection timed out".to_string()))?
            .map_err(|e| BlacklistError::Unavailable(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis token blacklist");

        Ok(Self { conn, config })
    }

    fn key(&self, jti: Uuid) -> String {
        format!("{}{}", self.config.key_prefix, jti)
    }
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn blacklist(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), BlacklistError> {
        let mut conn = self.conn.clone();
        let ttl_secs = (expires_at - Utc::now()).num_seconds().max(1) as u64;

        // SET NX makes check-and-insert one atomic step across instances.
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::EX(ttl_secs as _));

        let stored: Option<String> = conn
            .set_options(self.key(jti), 1, options)
            .await
            .map_err(|e| BlacklistError::Unavailable(e.to_string()))?;

        match stored {
            Some(_) => Ok(()),
            None => Err(BlacklistError::AlreadyBlacklisted),
        }
    }

    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool, BlacklistError> {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(self.key(jti))
            .await
            .map_err(|e| BlacklistError::Unavailable(e.to_string()))
    }
}
