//! Ola Maps places autocomplete client.
//!
//! Only the first prediction is used. Its coordinates count when both are
//! present and non-zero.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use blog_core::domain::Coordinates;
use blog_core::ports::{GeocodeError, Geocoder};

/// Geocoding provider configuration.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeocodingConfig {
    /// Load configuration from environment variables; `None` when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OLA_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;

        Some(Self {
            api_key,
            base_url: std::env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| "https://api.olamaps.io".to_string()),
            timeout: Duration::from_secs(
                std::env::var("GEOCODING_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    predictions: Option<Vec<Prediction>>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

/// Extract the first prediction's coordinates from an autocomplete body.
fn parse_autocomplete(body: &[u8]) -> Result<Option<Coordinates>, GeocodeError> {
    let response: AutocompleteResponse =
        serde_json::from_slice(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;

    let first = response
        .predictions
        .and_then(|p| p.into_iter().next())
        .ok_or(GeocodeError::NoCandidates)?;

    let location = first.geometry.and_then(|g| g.location);
    let coordinates = match location {
        Some(LatLng {
            lat: Some(latitude),
            lng: Some(longitude),
        }) if latitude != 0.0 && longitude != 0.0 => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Ok(coordinates)
}

/// HTTP geocoder backed by the Ola Maps autocomplete endpoint.
pub struct OlaMapsGeocoder {
    client: reqwest::Client,
    config: GeocodingConfig,
}

impl OlaMapsGeocoder {
    pub fn new(config: GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        tracing::info!(base_url = %config.base_url, "Geocoding client configured");

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Geocoder for OlaMapsGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!(
            "{}/places/v1/autocomplete",
            self.config.base_url.trim_end_matches('/')
        );

        // `without_url` keeps the API key out of error messages.
        let response = self
            .client
            .get(&url)
            .query(&[("input", query), ("api_key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GeocodeError::Request(e.without_url().to_string()))?;

        parse_autocomplete(&body)
    }
}
