//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod blacklist;
mod geocoding;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenKind, TokenPair, TokenService};
pub use blacklist::{BlacklistError, LogoutError, TokenBlacklist};
pub use geocoding::{GeocodeError, Geocoder};
pub use repository::{AuthorRepository, BaseRepository, PostRepository, UserRepository};
