//! Token handlers: login, logout and refresh.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use blog_core::ports::{
    AuthError, LogoutError, PasswordService, TokenBlacklist, TokenKind, TokenService,
};
use blog_shared::MessageResponse;
use blog_shared::dto::{AccessTokenResponse, LoginRequest, RefreshTokenRequest, TokenPairResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_LOGIN: &str = "Invalid email or password";

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let invalid = || AppError::Unauthorized(INVALID_LOGIN.to_string());

    let Some(user) = state.users.find_by_email(req.email.trim()).await? else {
        password_service.verify_decoy(&req.password);
        return Err(invalid());
    };

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let pair = token_service
        .issue_pair(user.id, &user.email, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        refresh: pair.refresh,
        access: pair.access,
    }))
}

/// POST /api/logout
pub async fn logout(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<RefreshTokenRequest>,
) -> AppResult<HttpResponse> {
    revoke(
        token_service.get_ref().as_ref(),
        state.blacklist.as_ref(),
        body.into_inner().refresh.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully.")))
}

async fn revoke(
    tokens: &dyn TokenService,
    blacklist: &dyn TokenBlacklist,
    refresh: Option<&str>,
) -> Result<(), LogoutError> {
    let token = refresh.ok_or(LogoutError::TokenMalformed(AuthError::MissingAuth))?;
    let claims = tokens.validate_token(token, TokenKind::Refresh)?;
    blacklist.blacklist(claims.jti, claims.expires_at()).await?;

    tracing::info!(user_id = %claims.user_id, jti = %claims.jti, "Refresh token blacklisted");
    Ok(())
}

/// POST /api/token/refresh
pub async fn refresh(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<RefreshTokenRequest>,
) -> AppResult<HttpResponse> {
    let invalid = || AppError::Unauthorized("Token is invalid or expired".to_string());

    let token = body.into_inner().refresh.ok_or_else(invalid)?;
    let claims = token_service
        .validate_token(&token, TokenKind::Refresh)
        .map_err(|e| {
            tracing::debug!(error = %e, "Refresh rejected");
            invalid()
        })?;

    let revoked = state.blacklist.is_blacklisted(claims.jti).await.map_err(|e| {
        tracing::error!("Token blacklist unavailable: {}", e);
        AppError::ServiceUnavailable("Token store unavailable".to_string())
    })?;
    if revoked {
        return Err(AppError::Unauthorized("Token is blacklisted".to_string()));
    }

    let access = token_service
        .access_from_refresh(&claims)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse { access }))
}
