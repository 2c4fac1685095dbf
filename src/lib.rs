//! # Sales Dashboard Core
//!
//! CRM acquisition and metrics aggregation for the prefab-house sales
//! dashboard. Exposes the Axum router and modules so integration tests can
//! create an in-process server without a running CRM.
//!
//! Data flows one way:
//!
//! `SessionManager` → `CrmClient` → `mapper` → `SalesRepository` → `metrics`

pub mod config;
pub mod crm;
pub mod dates;
pub mod entities;
pub mod error;
pub mod mapper;
pub mod metrics;
pub mod models;
pub mod numeric;
pub mod repository;
pub mod routes;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Build the Axum router with all route modules and middleware.
///
/// This function does NOT bind a socket; the caller serves the router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ventas::router())
        .merge(routes::metrics::router())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
