//! Handler error type and its HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use uuid::Uuid;

use blogicum_core::error::{DomainError, MutationError, RepoError};

use crate::urls::{login_url, post_url, redirect};
use crate::views::{ErrorPage, render};

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A non-author tried to change a post or comment. Sent back to the post.
    #[error("Not the author of post {post_id}")]
    Denied { post_id: Uuid },

    /// Anonymous visitor on a sign-in-only page.
    #[error("Login required for {next}")]
    LoginRequired { next: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Denied { .. } | AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Denied { post_id } => redirect(&post_url(*post_id)),
            AppError::LoginRequired { next } => redirect(&login_url(next)),
            AppError::NotFound(detail) => {
                tracing::debug!(detail = %detail, "Not found");
                error_page(StatusCode::NOT_FOUND, "Page not found")
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}

pub fn error_page(status: StatusCode, title: &str) -> HttpResponse {
    let page = ErrorPage {
        ctx: Default::default(),
        status: status.as_u16(),
        title: title.to_string(),
    };
    render(status, &page).unwrap_or_else(|_| HttpResponse::build(status).body(title.to_string()))
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{entity_type} {key}"))
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
            // Validation and Duplicate belong to forms and are handled there.
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MutationError> for AppError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Denied(denied) => AppError::Denied {
                post_id: denied.post_id,
            },
            MutationError::Domain(err) => err.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template error: {err}"))
    }
}
