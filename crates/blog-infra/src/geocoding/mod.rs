//! Geocoding client for the places autocomplete API.

mod ola;

pub use ola::{GeocodingConfig, OlaMapsGeocoder};
