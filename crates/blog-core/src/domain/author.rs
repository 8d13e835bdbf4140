use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AUTHOR_NAME_MAX_LEN, EMAIL_MAX_LEN};
use crate::error::DomainError;

/// Author entity - the public profile of a content creator.
///
/// Every author is backed by exactly one [`super::User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// Create a new author profile for the given user.
    pub fn new(user_id: Uuid, name: String, email: String, bio: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            email,
            bio,
            created_at: Utc::now(),
        }
    }

    /// Check the profile fields a client is allowed to set.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)?;
        validate_email(&self.email)
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation("name: This field may not be blank.".to_string()));
    }
    if name.chars().count() > AUTHOR_NAME_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "name: Ensure this field has no more than {AUTHOR_NAME_MAX_LEN} characters."
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());

    if !well_formed || email.len() > EMAIL_MAX_LEN {
        return Err(DomainError::Validation(
            "email: Enter a valid email address.".to_string(),
        ));
    }
    Ok(())
}
