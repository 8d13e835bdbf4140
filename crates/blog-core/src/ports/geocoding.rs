//! Geocoding port - resolves free-text locations to coordinates.

use async_trait::async_trait;

use crate::domain::Coordinates;

/// Geocoder trait - abstraction over the external places API.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` using the first candidate the provider returns.
    ///
    /// `Ok(None)` means the provider answered but the candidate carried no
    /// usable coordinates.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Geocoding errors. These are logged, never surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("No predictions in response")]
    NoCandidates,
}
