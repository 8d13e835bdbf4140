//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//! This crate contains database, token, and external service integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `redis` - Redis-backed refresh token blacklist
//! - `geocoding` - HTTP client for the places API

pub mod blacklist;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "geocoding")]
pub mod geocoding;

// Re-exports - In-Memory
pub use blacklist::InMemoryTokenBlacklist;
pub use database::{
    InMemoryAuthorRepository, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "geocoding")]
pub use geocoding::{GeocodingConfig, OlaMapsGeocoder};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use blacklist::{RedisConfig, RedisTokenBlacklist};
