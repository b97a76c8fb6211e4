//! Database queries for partners and leads

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Lead, LeadStatus, NewLead, Partner, StatusCount};

/// Get an active partner by its public slug
pub async fn get_partner_by_slug(pool: &PgPool, slug: &str) -> Result<Partner> {
    let partner = sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, slug, name, phone, branding, active, created_at
        FROM partners
        WHERE slug = $1
          AND active = true
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Partner"))?;

    Ok(partner)
}

/// Get a partner by id (active or not)
pub async fn get_partner(pool: &PgPool, partner_id: Uuid) -> Result<Partner> {
    let partner = sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, slug, name, phone, branding, active, created_at
        FROM partners
        WHERE id = $1
        "#,
    )
    .bind(partner_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Partner"))?;

    Ok(partner)
}

/// All active partners (for cache warming)
pub async fn get_active_partners(pool: &PgPool) -> Result<Vec<Partner>> {
    let partners = sqlx::query_as::<_, Partner>(
        r#"
        SELECT id, slug, name, phone, branding, active, created_at
        FROM partners
        WHERE active = true
        ORDER BY slug
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(partners)
}

/// Store a new lead with its computed price
pub async fn insert_lead(pool: &PgPool, lead: &NewLead) -> Result<Lead> {
    let inserted = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (
            id, partner_id, customer_name, phone, address, comment,
            pest_type, object_type, rooms, infestation_level,
            base_price, final_price, currency, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING
            id, partner_id, customer_name, phone, address, comment,
            pest_type, object_type, rooms, infestation_level,
            base_price, final_price, currency, status, notes,
            created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(lead.partner_id)
    .bind(&lead.customer_name)
    .bind(&lead.phone)
    .bind(&lead.address)
    .bind(&lead.comment)
    .bind(lead.pricing.pest_type.as_str())
    .bind(lead.pricing.object_type.as_str())
    .bind(lead.pricing.rooms.map(i16::from))
    .bind(lead.pricing.infestation_level.as_str())
    .bind(lead.quote.as_ref().map(|q| q.base_price))
    .bind(lead.quote.as_ref().map(|q| q.final_price))
    .bind(&lead.currency)
    .bind(LeadStatus::New.as_str())
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

/// Get one lead of a partner
pub async fn get_lead(pool: &PgPool, partner_id: Uuid, lead_id: Uuid) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>(
        r#"
        SELECT
            id, partner_id, customer_name, phone, address, comment,
            pest_type, object_type, rooms, infestation_level,
            base_price, final_price, currency, status, notes,
            created_at, updated_at
        FROM leads
        WHERE id = $1
          AND partner_id = $2
        "#,
    )
    .bind(lead_id)
    .bind(partner_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Lead"))?;

    Ok(lead)
}

/// List a partner's leads, newest first, with optional status filter
pub async fn list_leads(
    pool: &PgPool,
    partner_id: Uuid,
    status: Option<LeadStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Lead>> {
    let leads = sqlx::query_as::<_, Lead>(
        r#"
        SELECT
            id, partner_id, customer_name, phone, address, comment,
            pest_type, object_type, rooms, infestation_level,
            base_price, final_price, currency, status, notes,
            created_at, updated_at
        FROM leads
        WHERE partner_id = $1
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(partner_id)
    .bind(status.map(|s| s.as_str()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(leads)
}

/// Count a partner's leads (for pagination)
pub async fn count_leads(
    pool: &PgPool,
    partner_id: Uuid,
    status: Option<LeadStatus>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM leads
        WHERE partner_id = $1
          AND ($2::text IS NULL OR status = $2)
        "#,
    )
    .bind(partner_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Lead counts grouped by status
pub async fn count_leads_by_status(pool: &PgPool, partner_id: Uuid) -> Result<Vec<StatusCount>> {
    let counts = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM leads
        WHERE partner_id = $1
        GROUP BY status
        ORDER BY status
        "#,
    )
    .bind(partner_id)
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// Update a lead's status and notes
pub async fn update_lead(
    pool: &PgPool,
    partner_id: Uuid,
    lead_id: Uuid,
    status: LeadStatus,
    notes: Option<&str>,
) -> Result<Lead> {
    let lead = sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads
        SET status = $3,
            notes = COALESCE($4, notes),
            updated_at = now()
        WHERE id = $1
          AND partner_id = $2
        RETURNING
            id, partner_id, customer_name, phone, address, comment,
            pest_type, object_type, rooms, infestation_level,
            base_price, final_price, currency, status, notes,
            created_at, updated_at
        "#,
    )
    .bind(lead_id)
    .bind(partner_id)
    .bind(status.as_str())
    .bind(notes)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Lead"))?;

    Ok(lead)
}
