//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields are optional at the serde level so that missing fields reach
//! the handlers, which answer with the API's own validation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new author (and its login).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterAuthorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

/// Response to a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAuthorResponse {
    pub author_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Public representation of an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
}

/// Full (PUT) or partial (PATCH) author update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateAuthorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh/access token pair returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub refresh: String,
    pub access: String,
}

/// Body carrying a refresh token (logout, token refresh).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshTokenRequest {
    pub refresh: Option<String>,
}

/// Response to a token refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Request to create a post.
///
/// `location` is free text resolved to coordinates by the server; it is not
/// stored verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub location: Option<String>,
}

/// Full (PUT) or partial (PATCH) post update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Public representation of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Latitude.
    pub location_lang: Option<f64>,
    /// Longitude.
    pub location_long: Option<f64>,
    /// Id of the owning author.
    pub author: Uuid,
}
