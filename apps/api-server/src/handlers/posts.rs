//! Post handlers, including location enrichment on create.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{Coordinates, Post};
use blog_core::error::DomainError;
use blog_core::policy::{Action, post_access};
use blog_core::ports::{GeocodeError, Geocoder};
use blog_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        created_at: post.created_at,
        location_lang: post.location.map(|c| c.latitude),
        location_long: post.location.map(|c| c.longitude),
        author: post.author_id,
    }
}

fn required(field: &str, value: Option<String>) -> AppResult<String> {
    value.ok_or_else(|| AppError::BadRequest(format!("{field}: This field is required.")))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts: Vec<PostResponse> = state
        .posts
        .find_all()
        .await?
        .into_iter()
        .map(post_response)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn retrieve(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
///
/// The requester's author profile owns the post. A non-empty `location` is
/// geocoded inline; enrichment failures never fail the request.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let author = state
        .authors
        .find_by_user_id(identity.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("No author profile is linked to this account.".to_string())
        })?;

    let title = required("title", req.title)?;
    let content = required("content", req.content)?;
    let post = Post::new(author.id, title, content);
    post.validate()?;

    let location = match req.location.as_deref() {
        Some(query) if !query.is_empty() => locate(state.geocoder.as_deref(), query).await,
        _ => None,
    };

    let post = state.posts.insert(post.with_location(location)).await?;
    tracing::info!(
        post_id = %post.id,
        author_id = %author.id,
        geocoded = post.location.is_some(),
        "Post created"
    );

    Ok(HttpResponse::Created().json(post_response(post)))
}

/// Best-effort geocoding. Every failure is logged and yields `None`.
async fn locate(geocoder: Option<&dyn Geocoder>, query: &str) -> Option<Coordinates> {
    let Some(geocoder) = geocoder else {
        tracing::warn!(location = query, "Geocoding disabled; saving post without coordinates");
        return None;
    };

    match geocoder.geocode(query).await {
        Ok(Some(coordinates)) => Some(coordinates),
        Ok(None) => {
            tracing::warn!(location = query, "No coordinates found for location");
            None
        }
        Err(e @ (GeocodeError::Request(_) | GeocodeError::Status(_))) => {
            tracing::error!(location = query, error = %e, "Error fetching location data");
            None
        }
        Err(e) => {
            tracing::error!(location = query, error = %e, "Error parsing location data");
            None
        }
    }
}

/// PUT /api/posts/{id}
pub async fn replace(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let changes = body.into_inner();
    let changes = UpdatePostRequest {
        title: Some(required("title", changes.title)?),
        content: Some(required("content", changes.content)?),
    };

    update(&state, &identity, path.into_inner(), changes).await
}

/// PATCH /api/posts/{id}
pub async fn patch(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    update(&state, &identity, path.into_inner(), body.into_inner()).await
}

async fn update(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    changes: UpdatePostRequest,
) -> AppResult<HttpResponse> {
    let mut post = load(state, id).await?;
    authorize(state, identity, &post, Action::Update).await?;

    if let Some(title) = changes.title {
        post.title = title;
    }
    if let Some(content) = changes.content {
        post.content = content;
    }
    post.validate()?;

    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Post updated");

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load(&state, path.into_inner()).await?;
    authorize(&state, &identity, &post, Action::Delete).await?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

async fn authorize(
    state: &AppState,
    identity: &Identity,
    post: &Post,
    action: Action,
) -> AppResult<()> {
    let owner = state
        .authors
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::from(DomainError::not_found("Author", post.author_id)))?;

    let actor = identity.actor(state.authors.as_ref()).await?;
    post_access(&actor, post, &owner, action).into_result()?;
    Ok(())
}

async fn load(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", id).into())
}
