//! HTTP handlers and route configuration.

mod auth;
mod authors;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, error::InternalError, web};
use blog_shared::ErrorResponse;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(path_config()).service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Token routes
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout))
            .route("/token/refresh", web::post().to(auth::refresh))
            .service(
                web::scope("/authors")
                    .route("", web::get().to(authors::list))
                    .route("", web::post().to(authors::register))
                    .route("/{id}", web::get().to(authors::retrieve))
                    .route("/{id}", web::put().to(authors::replace))
                    .route("/{id}", web::patch().to(authors::patch))
                    .route("/{id}", web::delete().to(authors::destroy)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::retrieve))
                    .route("/{id}", web::put().to(posts::replace))
                    .route("/{id}", web::patch().to(posts::patch))
                    .route("/{id}", web::delete().to(posts::destroy)),
            ),
    );
}

/// Malformed JSON bodies answer 400 in the common error shape.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse::bad_request(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// Path ids that are not UUIDs cannot name a resource.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::NotFound().json(ErrorResponse::not_found("Not found."));
        InternalError::from_response(err, response).into()
    })
}
