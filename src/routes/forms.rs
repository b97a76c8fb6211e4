//! Partner-branded intake form endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::{LeadStatus, NewLead, Partner, PartnerBranding};
use crate::pricing::models::MAX_RULE_ROOMS;
use crate::pricing::requests::QuoteRequest;
use crate::pricing::responses::{QuoteDetailsResponse, QuoteResponse};
use crate::pricing::services::{load_catalog, quote_for_partner};
use crate::pricing::{InfestationLevel, ObjectType, PestType};
use crate::AppState;

/// Lead submitted through an intake form
#[derive(Debug, Deserialize)]
pub struct CreateLeadRequest {
    #[serde(flatten)]
    pub pricing: QuoteRequest,
    pub customer_name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Selectable value on the form
#[derive(Debug, Serialize)]
pub struct FormOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PricedCombination {
    pub pest_type: PestType,
    pub object_type: ObjectType,
}

#[derive(Debug, Serialize)]
pub struct PartnerProfile {
    pub slug: String,
    pub name: String,
    pub phone: Option<String>,
    pub branding: PartnerBranding,
}

/// Everything a form needs to render
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub partner: PartnerProfile,
    pub currency: String,
    pub pest_types: Vec<FormOption>,
    pub object_types: Vec<FormOption>,
    pub infestation_levels: Vec<FormOption>,
    pub max_rooms: u8,
    pub priced: Vec<PricedCombination>,
}

#[derive(Debug, Serialize)]
pub struct LeadSubmittedResponse {
    pub lead_id: Uuid,
    pub status: LeadStatus,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteDetailsResponse>,
}

/// Form configuration for a partner
pub async fn form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<FormResponse>> {
    let partner = find_partner(&state, &slug).await?;
    let catalog = load_catalog(&state.db, &state.cache, partner.id).await?;

    Ok(Json(FormResponse {
        partner: PartnerProfile {
            slug: partner.slug.clone(),
            name: partner.name.clone(),
            phone: partner.phone.clone(),
            branding: partner.branding(),
        },
        currency: state.currency.clone(),
        pest_types: PestType::ALL
            .iter()
            .map(|p| FormOption {
                value: p.as_str(),
                label: p.label(),
            })
            .collect(),
        object_types: ObjectType::ALL
            .iter()
            .map(|o| FormOption {
                value: o.as_str(),
                label: o.label(),
            })
            .collect(),
        infestation_levels: InfestationLevel::ALL
            .iter()
            .map(|l| FormOption {
                value: l.as_str(),
                label: l.label(),
            })
            .collect(),
        max_rooms: MAX_RULE_ROOMS,
        priced: catalog
            .priced_combinations()
            .into_iter()
            .map(|(pest_type, object_type)| PricedCombination {
                pest_type,
                object_type,
            })
            .collect(),
    }))
}

/// Price preview before submitting
pub async fn quote(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let input = request.to_input()?;
    let partner = find_partner(&state, &slug).await?;
    let quote = quote_for_partner(&state.db, &state.cache, partner.id, &input).await?;

    Ok(Json(QuoteResponse::new(quote.as_ref(), &state.currency)))
}

/// Submit a lead; the quoted price is stored with it
pub async fn submit_lead(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadSubmittedResponse>)> {
    let input = request.pricing.to_input()?;
    let partner = find_partner(&state, &slug).await?;
    let quote = quote_for_partner(&state.db, &state.cache, partner.id, &input).await?;

    let new_lead = NewLead::new(
        partner.id,
        &request.customer_name,
        &request.phone,
        request.address.as_deref(),
        request.comment.as_deref(),
        input,
        quote.clone(),
        &state.currency,
    )?;
    let lead = db::insert_lead(&state.db, &new_lead).await?;

    tracing::info!(
        "Lead {} received for partner {} (price {})",
        lead.id,
        partner.slug,
        quote
            .as_ref()
            .map(|q| q.final_price.to_string())
            .unwrap_or_else(|| "unavailable".to_string())
    );

    Ok((
        StatusCode::CREATED,
        Json(LeadSubmittedResponse {
            lead_id: lead.id,
            status: LeadStatus::New,
            available: quote.is_some(),
            quote: quote
                .as_ref()
                .map(|q| QuoteDetailsResponse::from_quote(q, &state.currency)),
        }),
    ))
}

/// Look up an active partner by slug, cache first
async fn find_partner(state: &AppState, slug: &str) -> Result<Arc<Partner>> {
    if let Some(cached) = state.cache.partners.get(slug).await {
        tracing::debug!("Cache HIT for partner: {}", slug);
        return Ok(cached);
    }
    tracing::debug!("Cache MISS for partner: {}", slug);

    let partner = Arc::new(db::get_partner_by_slug(&state.db, slug).await?);
    state
        .cache
        .partners
        .insert(slug.to_string(), partner.clone())
        .await;

    Ok(partner)
}
