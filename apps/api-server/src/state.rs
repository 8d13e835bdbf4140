//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{AuthorRepository, Geocoder, PostRepository, TokenBlacklist, UserRepository};
use blog_infra::{InMemoryStore, InMemoryTokenBlacklist};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    /// `None` when location enrichment is not configured.
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            users: Arc::new(store.users()),
            authors: Arc::new(store.authors()),
            posts: Arc::new(store.posts()),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Backends that fail to initialise are logged and replaced by their
    /// in-memory counterpart.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::repositories(config).await;
        let blacklist = Self::blacklist(config).await;
        let geocoder = Self::geocoder(config);

        tracing::info!(geocoding = geocoder.is_some(), "Application state initialized");

        Self {
            users: repos.users,
            authors: repos.authors,
            posts: repos.posts,
            blacklist,
            geocoder,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        use blog_infra::database::{
            PostgresAuthorRepository, PostgresPostRepository, PostgresUserRepository, connect,
        };

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Repositories::in_memory();
        };

        match connect(db_config).await {
            Ok(db) => Repositories {
                users: Arc::new(PostgresUserRepository::new(db.clone())),
                authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
                posts: Arc::new(PostgresPostRepository::new(db)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Repositories::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(config: &AppConfig) -> Repositories {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Repositories::in_memory()
    }

    #[cfg(feature = "redis")]
    async fn blacklist(config: &AppConfig) -> Arc<dyn TokenBlacklist> {
        use blog_infra::RedisTokenBlacklist;

        let Some(redis_config) = config.redis.clone() else {
            tracing::info!("REDIS_URL not set. Using in-memory token blacklist.");
            return Arc::new(InMemoryTokenBlacklist::new());
        };

        match RedisTokenBlacklist::new(redis_config).await {
            Ok(blacklist) => Arc::new(blacklist),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to Redis: {}. Using in-memory token blacklist.",
                    e
                );
                Arc::new(InMemoryTokenBlacklist::new())
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn blacklist(_config: &AppConfig) -> Arc<dyn TokenBlacklist> {
        Arc::new(InMemoryTokenBlacklist::new())
    }

    #[cfg(feature = "geocoding")]
    fn geocoder(config: &AppConfig) -> Option<Arc<dyn Geocoder>> {
        use blog_infra::OlaMapsGeocoder;

        let Some(geo_config) = config.geocoding.clone() else {
            tracing::warn!("OLA_MAPS_API_KEY not set. Posts will be created without coordinates.");
            return None;
        };

        match OlaMapsGeocoder::new(geo_config) {
            Ok(geocoder) => Some(Arc::new(geocoder)),
            Err(e) => {
                tracing::error!(
                    "Failed to build geocoding client: {}. Location enrichment disabled.",
                    e
                );
                None
            }
        }
    }

    #[cfg(not(feature = "geocoding"))]
    fn geocoder(_config: &AppConfig) -> Option<Arc<dyn Geocoder>> {
        None
    }
}
