//! HTTP routes

pub mod forms;
pub mod health;
pub mod leads;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Intake form, dashboard lead and health routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/forms/:slug", get(forms::form))
        .route("/api/forms/:slug/quote", post(forms::quote))
        .route("/api/forms/:slug/leads", post(forms::submit_lead))
        .route("/api/partners/:partner_id/leads", get(leads::list))
        .route("/api/partners/:partner_id/leads/stats", get(leads::stats))
        .route(
            "/api/partners/:partner_id/leads/:lead_id",
            get(leads::detail).patch(leads::update),
        )
}
