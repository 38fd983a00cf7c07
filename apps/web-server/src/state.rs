//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::BlogService;
use blogicum_core::ports::{PasswordService, TokenService, UserRepository};
use blogicum_infra::{Argon2PasswordService, DatabaseConnections, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blogicum_infra::PostgresRepositories;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub db: Option<DatabaseConnections>,
    pub cookie_secure: bool,
}

impl AppState {
    /// Build the state from configuration, falling back to in-memory storage
    /// when no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.session.clone()));

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let repos = PostgresRepositories::new(connections.main.clone());
                    let blog = BlogService::new(
                        repos.users.clone(),
                        repos.categories,
                        repos.locations,
                        repos.posts,
                        repos.comments,
                    );
                    tracing::info!(storage = "postgres", "Application state initialized");
                    return Self {
                        blog,
                        users: repos.users,
                        tokens,
                        passwords: Arc::new(Argon2PasswordService::new()),
                        db: Some(connections),
                        cookie_secure: config.cookie_secure,
                    };
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to connect to database. Using in-memory fallback."
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory storage");

        let mut state = Self::in_memory(InMemoryStore::new(), tokens);
        state.cookie_secure = config.cookie_secure;
        state
    }

    /// State backed by `store`. Clones of the store share its data.
    pub fn in_memory(store: InMemoryStore, tokens: Arc<dyn TokenService>) -> Self {
        let shared = Arc::new(store);
        Self {
            blog: BlogService::new(
                shared.clone(),
                shared.clone(),
                shared.clone(),
                shared.clone(),
                shared.clone(),
            ),
            users: shared,
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
            db: None,
            cookie_secure: false,
        }
    }

    pub fn storage(&self) -> &'static str {
        if self.db.is_some() { "postgres" } else { "memory" }
    }
}
