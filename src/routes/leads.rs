//! Dashboard lead management handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::models::{optional_text, Lead, LeadStatus, StatusCount};
use crate::AppState;

const LEADS_PER_PAGE: i64 = 25;

/// Query parameters for lead listing
#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<Lead>,
    pub page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Serialize)]
pub struct LeadStatsResponse {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
}

/// Partial lead update from the dashboard
#[derive(Debug, Deserialize)]
pub struct UpdateLeadRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Lead listing, newest first
pub async fn list(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<LeadListResponse>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<LeadStatus>)
        .transpose()?;
    let page = query.page.max(1);
    let offset = (page - 1)
        .checked_mul(LEADS_PER_PAGE)
        .ok_or_else(|| AppError::Validation(format!("Page {} is out of range", page)))?;

    let leads = db::list_leads(&state.db, partner_id, status, LEADS_PER_PAGE, offset).await?;
    let total = db::count_leads(&state.db, partner_id, status).await?;
    let total_pages = (total + LEADS_PER_PAGE - 1) / LEADS_PER_PAGE;

    Ok(Json(LeadListResponse {
        leads,
        page,
        total,
        total_pages,
        has_previous: page > 1,
        has_next: page < total_pages,
    }))
}

/// Lead counts per status
pub async fn stats(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> Result<Json<LeadStatsResponse>> {
    let by_status = db::count_leads_by_status(&state.db, partner_id).await?;
    let total = by_status.iter().map(|c| c.count).sum();

    Ok(Json(LeadStatsResponse { total, by_status }))
}

/// Lead detail
pub async fn detail(
    State(state): State<AppState>,
    Path((partner_id, lead_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Lead>> {
    let lead = db::get_lead(&state.db, partner_id, lead_id).await?;
    Ok(Json(lead))
}

/// Change status and/or notes
pub async fn update(
    State(state): State<AppState>,
    Path((partner_id, lead_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>> {
    let requested = request
        .status
        .as_deref()
        .map(str::parse::<LeadStatus>)
        .transpose()?;
    let notes = optional_text("notes", request.notes.as_deref())?;

    let lead = db::get_lead(&state.db, partner_id, lead_id).await?;
    let current = lead.status()?;
    let next = requested.unwrap_or(current);
    if !current.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "Lead cannot move from {} to {}",
            current, next
        )));
    }

    let updated =
        db::update_lead(&state.db, partner_id, lead_id, next, notes.as_deref()).await?;

    tracing::info!("Lead {} moved from {} to {}", lead_id, current, next);
    Ok(Json(updated))
}
