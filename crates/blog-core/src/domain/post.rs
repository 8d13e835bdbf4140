use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::POST_TITLE_MAX_LEN;
use crate::error::DomainError;

/// A resolved geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Post entity - a blog post owned by exactly one author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    /// Server-assigned from the geocoder at creation time, never by clients.
    pub location: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, title: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            location: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_location(mut self, location: Option<Coordinates>) -> Self {
        self.location = location;
        self
    }

    /// Check the client-writable fields.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation(
                "title: This field may not be blank.".to_string(),
            ));
        }
        if self.title.chars().count() > POST_TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "title: Ensure this field has no more than {POST_TITLE_MAX_LEN} characters."
            )));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::Validation(
                "content: This field may not be blank.".to_string(),
            ));
        }
        Ok(())
    }
}
