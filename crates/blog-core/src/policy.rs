//! Authorization policy for mutating operations.
//!
//! Each check is a plain function of `(actor, resource, action)`. Handlers load
//! the resource first, evaluate the policy, and only then mutate.

use uuid::Uuid;

use crate::domain::{Author, Post};
use crate::error::DomainError;

/// The authenticated party performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub is_staff: bool,
    /// The author profile linked to the user, if one still exists.
    pub author_id: Option<Uuid>,
}

/// Mutating action being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Update => "edit",
            Action::Delete => "delete",
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Denied, with a message suitable for the client.
    Deny(String),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            Access::Allow => Ok(()),
            Access::Deny(message) => Err(DomainError::Forbidden(message)),
        }
    }
}

/// Author profiles may be changed by their owning user or by staff.
pub fn author_access(actor: &Actor, author: &Author, action: Action) -> Access {
    if author.user_id == actor.user_id || actor.is_staff {
        Access::Allow
    } else {
        Access::Deny(format!("You cannot {} this author profile.", action.verb()))
    }
}

/// Posts may be changed only by their owning author. Staff get no override here.
pub fn post_access(actor: &Actor, post: &Post, owner: &Author, action: Action) -> Access {
    if actor.author_id == Some(post.author_id) {
        Access::Allow
    } else {
        Access::Deny(format!(
            "You cannot {} this post. This is {}'s post.",
            action.verb(),
            owner.name
        ))
    }
}
