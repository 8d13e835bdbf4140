//! In-memory token blacklist - used when Redis is not configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::ports::{BlacklistError, TokenBlacklist};

/// In-memory blacklist keyed by token id.
///
/// Entries are dropped once the revoked token has expired anyway.
/// Note: Data is lost on process restart and not shared between instances.
pub struct InMemoryTokenBlacklist {
    entries: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn blacklist(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), BlacklistError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, exp| *exp > now);

        if entries.contains_key(&jti) {
            return Err(BlacklistError::AlreadyBlacklisted);
        }
        entries.insert(jti, expires_at);
        Ok(())
    }

    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool, BlacklistError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&jti).is_some_and(|exp| *exp > Utc::now()))
    }
}
