//! Lead capture, CRM and pricing calculator for pest-control partners.
//!
//! The pricing core lives in [`pricing`]; everything else is the HTTP and
//! storage layer around it.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod telemetry;

use axum::Router;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::AppCache;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub currency: String,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .merge(pricing::router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Intake forms are embedded on partner sites
        .layer(CorsLayer::permissive())
        .with_state(state)
}
