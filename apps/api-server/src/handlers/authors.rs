//! Author handlers: registration and profile management.

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use blog_core::domain::{Author, User};
use blog_core::error::{DomainError, RepoError};
use blog_core::policy::{Action, author_access};
use blog_core::ports::PasswordService;
use blog_shared::dto::{
    AuthorResponse, RegisterAuthorRequest, RegisterAuthorResponse, UpdateAuthorRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DUPLICATE_EMAIL: &str = "An author with this email already exists";

fn author_response(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        name: author.name,
        email: author.email,
        bio: author.bio,
    }
}

/// Drop absent and blank values.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/authors
///
/// Creates the login user and its author profile in one unit of work.
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterAuthorRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let (Some(name), Some(email), Some(password)) =
        (present(req.name), present(req.email), present(req.password))
    else {
        return Err(AppError::BadRequest(
            "Please provide name, email, and password".to_string(),
        ));
    };
    let email = email.trim().to_string();

    let mut author = Author::new(Uuid::nil(), name, email, req.bio.unwrap_or_default());
    author.validate()?;

    if state.users.find_by_email(&author.email).await?.is_some()
        || state.authors.find_by_email(&author.email).await?.is_some()
    {
        return Err(DomainError::Duplicate(DUPLICATE_EMAIL.to_string()).into());
    }

    let password_hash = password_service
        .hash(&password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = User::new(author.email.clone(), password_hash);
    author.user_id = user.id;

    let author = match state.authors.register(user, author).await {
        Ok(author) => author,
        // Lost a race with a concurrent registration for the same email.
        Err(RepoError::Constraint(_)) => {
            return Err(DomainError::Duplicate(DUPLICATE_EMAIL.to_string()).into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(author_id = %author.id, user_id = %author.user_id, "Author registered");

    Ok(HttpResponse::Created().json(RegisterAuthorResponse {
        author_id: author.id,
        name: author.name,
        email: author.email,
    }))
}

/// GET /api/authors
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors: Vec<AuthorResponse> = state
        .authors
        .find_all()
        .await?
        .into_iter()
        .map(author_response)
        .collect();

    Ok(HttpResponse::Ok().json(authors))
}

/// GET /api/authors/{id}
pub async fn retrieve(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let author = load(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(author_response(author)))
}

/// PUT /api/authors/{id}
pub async fn replace(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAuthorRequest>,
) -> AppResult<HttpResponse> {
    let changes = body.into_inner();
    for (field, value) in [("name", &changes.name), ("email", &changes.email)] {
        if value.is_none() {
            return Err(AppError::BadRequest(format!("{field}: This field is required.")));
        }
    }

    update(&state, &identity, path.into_inner(), changes).await
}

/// PATCH /api/authors/{id}
pub async fn patch(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAuthorRequest>,
) -> AppResult<HttpResponse> {
    update(&state, &identity, path.into_inner(), body.into_inner()).await
}

async fn update(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    changes: UpdateAuthorRequest,
) -> AppResult<HttpResponse> {
    let mut author = load(state, id).await?;

    let actor = identity.actor(state.authors.as_ref()).await?;
    author_access(&actor, &author, Action::Update).into_result()?;

    if let Some(name) = changes.name {
        author.name = name;
    }
    if let Some(email) = changes.email {
        author.email = email.trim().to_string();
    }
    if let Some(bio) = changes.bio {
        author.bio = bio;
    }
    author.validate()?;

    if let Some(other) = state.authors.find_by_email(&author.email).await? {
        if other.id != author.id {
            return Err(DomainError::Duplicate(DUPLICATE_EMAIL.to_string()).into());
        }
    }

    let author = state.authors.update(author).await?;
    tracing::info!(author_id = %author.id, user_id = %identity.user_id, "Author updated");

    Ok(HttpResponse::Ok().json(author_response(author)))
}

/// DELETE /api/authors/{id}
///
/// Removes the profile and its posts; the login user is kept.
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let author = load(&state, path.into_inner()).await?;

    let actor = identity.actor(state.authors.as_ref()).await?;
    author_access(&actor, &author, Action::Delete).into_result()?;

    state.authors.delete(author.id).await?;
    tracing::info!(author_id = %author.id, user_id = %identity.user_id, "Author deleted");

    Ok(HttpResponse::NoContent().finish())
}

async fn load(state: &AppState, id: Uuid) -> AppResult<Author> {
    state
        .authors
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Author", id).into())
}
