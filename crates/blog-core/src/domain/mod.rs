//! Domain entities - the core business objects.

mod author;
mod post;
mod user;

pub use author::Author;
pub use post::{Coordinates, Post};
pub use user::{ROLE_STAFF, ROLE_USER, User};

/// Maximum length of an author's display name.
pub const AUTHOR_NAME_MAX_LEN: usize = 100;

/// Maximum length of an email address.
pub const EMAIL_MAX_LEN: usize = 254;

/// Maximum length of a post title.
pub const POST_TITLE_MAX_LEN: usize = 200;
