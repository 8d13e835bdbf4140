//! Authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};
use std::sync::Arc;

use blog_core::domain::ROLE_STAFF;
use blog_core::error::RepoError;
use blog_core::policy::Actor;
use blog_core::ports::{AuthError, AuthorRepository, TokenClaims, TokenKind, TokenService};

/// Authenticated user identity extractor.
///
/// Only access tokens are accepted; a refresh token in the
/// `Authorization` header is rejected.
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_staff(&self) -> bool {
        self.has_role(ROLE_STAFF)
    }

    /// Resolve the policy actor, looking up the author profile linked to this user.
    pub async fn actor(&self, authors: &dyn AuthorRepository) -> Result<Actor, RepoError> {
        let author = authors.find_by_user_id(self.user_id).await?;
        Ok(Actor {
            user_id: self.user_id,
            is_staff: self.is_staff(),
            author_id: author.map(|a| a.id),
        })
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            roles: claims.roles,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub enum AuthenticationError {
    Rejected(AuthError),
    /// The token service was not registered as app data.
    Misconfigured,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationError::Rejected(e) => write!(f, "{}", e),
            AuthenticationError::Misconfigured => write!(f, "token service not configured"),
        }
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AuthenticationError::Rejected(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthenticationError::Misconfigured => {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use blog_shared::ErrorResponse;

        let error = match self {
            AuthenticationError::Rejected(AuthError::MissingAuth) => {
                ErrorResponse::unauthorized("Authentication credentials were not provided.")
            }
            AuthenticationError::Rejected(other) => {
                tracing::debug!(error = %other, "Rejected bearer token");
                ErrorResponse::unauthorized("Given token not valid for any token type")
            }
            AuthenticationError::Misconfigured => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token_service = match req.app_data::<actix_web::web::Data<Arc<dyn TokenService>>>() {
            Some(service) => service,
            None => {
                tracing::error!("TokenService not found in app data");
                return ready(Err(AuthenticationError::Misconfigured));
            }
        };

        let auth_header = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => value,
            None => return ready(Err(AuthenticationError::Rejected(AuthError::MissingAuth))),
        };

        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => {
                return ready(Err(AuthenticationError::Rejected(AuthError::InvalidToken(
                    "Invalid authorization header".to_string(),
                ))));
            }
        };

        // Parse "Bearer <token>"
        let token = match auth_str.strip_prefix("Bearer ") {
            Some(t) => t.trim(),
            None => {
                return ready(Err(AuthenticationError::Rejected(AuthError::InvalidToken(
                    "Expected Bearer token".to_string(),
                ))));
            }
        };

        match token_service.validate_token(token, TokenKind::Access) {
            Ok(claims) => ready(Ok(Identity::from(claims))),
            Err(e) => ready(Err(AuthenticationError::Rejected(e))),
        }
    }
}
