//! Refresh token blacklist implementations - Redis and in-memory fallback.

mod memory;

pub use memory::InMemoryTokenBlacklist;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisTokenBlacklist};
