//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use blog_infra::JwtConfig;
use blog_infra::database::DatabaseConfig;

#[cfg(feature = "geocoding")]
use blog_infra::GeocodingConfig;
#[cfg(feature = "redis")]
use blog_infra::RedisConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on in-memory storage.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[cfg(feature = "geocoding")]
    pub geocoding: Option<GeocodingConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(2),
            connect_timeout: Duration::from_secs(parse_var("DB_CONNECT_TIMEOUT_SECS").unwrap_or(8)),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "geocoding")]
            geocoding: GeocodingConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
