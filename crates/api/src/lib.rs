//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the monthly rent workbench
//! - The cache of open workbenches
//! - JSON error responses

pub mod error;
pub mod routes;
pub mod workbenches;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use rentbook_core::rents::RentsService;
use rentbook_db::{PropertyRepository, RentsRepository, TenantRepository};
use rentbook_shared::AppConfig;

pub use workbenches::WorkbenchStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Rent reconciliation over the database.
    pub rents: RentsService<RentsRepository>,
    /// Open workbenches.
    pub workbenches: WorkbenchStore,
}

impl AppState {
    /// Builds the state from a connection and configuration.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let rents = RentsService::new(Arc::new(RentsRepository::new(db.clone())));
        Self {
            db: Arc::new(db),
            rents,
            workbenches: WorkbenchStore::new(&config.workbench),
        }
    }

    /// Property lookups.
    #[must_use]
    pub fn properties(&self) -> PropertyRepository {
        PropertyRepository::new((*self.db).clone())
    }

    /// Tenant lookups.
    #[must_use]
    pub fn tenants(&self) -> TenantRepository {
        TenantRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
