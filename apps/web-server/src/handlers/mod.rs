//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod profile;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppError;
use crate::views::{ErrorPage, PageContext, render};

/// `?page=` of the listing pages.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .route("/", web::get().to(posts::index))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/posts")
            // Before "/{post_id}/" so that "create" is not read as an id.
            .route("/create/", web::get().to(posts::create_form))
            .route("/create/", web::post().to(posts::create))
            .route("/{post_id}/", web::get().to(posts::detail))
            .route("/{post_id}/edit/", web::get().to(posts::edit_form))
            .route("/{post_id}/edit/", web::post().to(posts::edit))
            .route("/{post_id}/delete/", web::get().to(posts::delete_form))
            .route("/{post_id}/delete/", web::post().to(posts::delete))
            .route("/{post_id}/comment/", web::post().to(comments::add))
            .route(
                "/{post_id}/edit_comment/{comment_id}/",
                web::get().to(comments::edit_form),
            )
            .route(
                "/{post_id}/edit_comment/{comment_id}/",
                web::post().to(comments::edit),
            )
            .route(
                "/{post_id}/delete_comment/{comment_id}/",
                web::get().to(comments::delete_form),
            )
            .route(
                "/{post_id}/delete_comment/{comment_id}/",
                web::post().to(comments::delete),
            ),
    )
    .route("/category/{category_slug}/", web::get().to(posts::category))
    .route("/profile/{username}/", web::get().to(profile::profile))
    .route("/edit_profile/", web::get().to(profile::edit_form))
    .route("/edit_profile/", web::post().to(profile::edit))
    .service(
        web::scope("/auth")
            .route("/registration/", web::get().to(auth::registration_form))
            .route("/registration/", web::post().to(auth::register))
            .route("/login/", web::get().to(auth::login_form))
            .route("/login/", web::post().to(auth::login))
            .route("/logout/", web::post().to(auth::logout)),
    )
    .default_service(web::to(not_found));
}

/// Fallback for unknown URLs.
pub async fn not_found(identity: OptionalIdentity) -> HttpResponse {
    let page = ErrorPage {
        ctx: PageContext::from(&identity),
        status: 404,
        title: "Page not found".to_string(),
    };
    render(StatusCode::NOT_FOUND, &page)
        .unwrap_or_else(|_| HttpResponse::NotFound().body("Page not found"))
}
