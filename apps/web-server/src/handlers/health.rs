//! Health check endpoint.

use actix_web::{HttpResponse, web};

use blogicum_shared::{ErrorResponse, HealthResponse};

use crate::state::AppState;

/// GET /health
///
/// 200 with the storage in use, or 503 when the database stopped answering.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    #[cfg(feature = "postgres")]
    if let Some(db) = &state.db {
        if !db.ping().await {
            tracing::warn!("Health check failed: database unreachable");
            return HttpResponse::ServiceUnavailable()
                .json(ErrorResponse::service_unavailable("Database is unreachable"));
        }
    }

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
