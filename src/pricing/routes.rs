//! Partner-side pricing endpoints: rule management and the dashboard
//! calculator.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::warn;
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::AppState;

use super::models::PricingRule;
use super::queries;
use super::requests::{QuoteRequest, ReplaceRulesRequest};
use super::responses::{PricingRuleResponse, PricingRulesResponse, QuoteResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/partners/:partner_id/pricing-rules",
            get(list_rules).put(replace_rules),
        )
        .route("/api/partners/:partner_id/quote", post(quote))
}

/// List a partner's pricing rules
async fn list_rules(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<PricingRulesResponse>> {
    db::get_partner(&state.db, partner_id).await?;

    let rows = queries::get_partner_rules(&state.db, partner_id).await?;
    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        let rule_id = row.id;
        match PricingRule::try_from(row) {
            Ok(rule) => rules.push(PricingRuleResponse::from(&rule)),
            Err(e) => warn!("Hiding malformed pricing rule {}: {}", rule_id, e),
        }
    }

    Ok(Json(PricingRulesResponse {
        partner_id,
        currency: state.currency.clone(),
        rules,
    }))
}

/// Replace a partner's whole rule set
async fn replace_rules(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    Json(request): Json<ReplaceRulesRequest>,
) -> Result<Json<PricingRulesResponse>> {
    db::get_partner(&state.db, partner_id).await?;

    let rules = request.to_rules(partner_id)?;
    let stored = services::replace_rules(&state.db, &state.cache, partner_id, rules).await?;

    Ok(Json(PricingRulesResponse {
        partner_id,
        currency: state.currency.clone(),
        rules: stored.iter().map(PricingRuleResponse::from).collect(),
    }))
}

/// Dashboard calculator
async fn quote(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let input = request.to_input()?;
    // Catalogs are only ever cached for partners that exist
    if !state.cache.catalogs.contains_key(&partner_id) {
        db::get_partner(&state.db, partner_id).await?;
    }
    let quote = services::quote_for_partner(&state.db, &state.cache, partner_id, &input).await?;

    Ok(Json(QuoteResponse::new(quote.as_ref(), &state.currency)))
}
