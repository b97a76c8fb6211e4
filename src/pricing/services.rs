//! Pricing service functions with database access.
//!
//! These functions go through the cache first and fall back to the database
//! for partner catalogs.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use moka::ops::compute::Op;
use moka::Entry;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{self, PriceQuote};
use super::catalog::PricingCatalog;
use super::models::{LeadPricingInput, ObjectType, PestType, PricingRule, Variant};
use super::queries;

/// Pricing validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    UnknownValue {
        field: &'static str,
        value: String,
    },
    InvalidVariant {
        object_type: ObjectType,
        variant: String,
    },
    InvalidRooms {
        rooms: i64,
    },
    InvalidRule {
        rule_id: String,
        message: String,
    },
    DuplicateRule {
        pest_type: PestType,
        object_type: ObjectType,
        variant: Variant,
    },
}

impl PricingError {
    /// Name of the offending input field, when there is one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PricingError::UnknownValue { field, .. } => Some(*field),
            PricingError::InvalidVariant { .. } => Some("variant"),
            PricingError::InvalidRooms { .. } => Some("rooms"),
            PricingError::InvalidRule { .. } | PricingError::DuplicateRule { .. } => None,
        }
    }
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::UnknownValue { field, value } => {
                write!(f, "Unknown {} value '{}'", field, value)
            }
            PricingError::InvalidVariant { object_type, variant } => {
                write!(f, "Variant '{}' is not allowed for object type {}", variant, object_type)
            }
            PricingError::InvalidRooms { rooms } => {
                write!(f, "Room count must be a positive number, got {}", rooms)
            }
            PricingError::InvalidRule { rule_id, message } => {
                write!(f, "Invalid pricing rule {}: {}", rule_id, message)
            }
            PricingError::DuplicateRule {
                pest_type,
                object_type,
                variant,
            } => {
                write!(
                    f,
                    "Duplicate pricing rule for {}/{}/{}",
                    pest_type, object_type, variant
                )
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// Load a partner's catalog, from cache when possible.
///
/// Malformed rows are skipped with a warning rather than failing the whole
/// catalog.
pub async fn load_catalog(
    pool: &PgPool,
    cache: &AppCache,
    partner_id: Uuid,
) -> Result<Arc<PricingCatalog>, AppError> {
    cached_or_fetch(cache, partner_id, fetch_catalog(pool, partner_id)).await
}

/// Reload a partner's catalog from the database, replacing any cached one.
pub async fn refresh_catalog(
    pool: &PgPool,
    cache: &AppCache,
    partner_id: Uuid,
) -> Result<(), AppError> {
    cache
        .catalogs
        .entry(partner_id)
        .and_try_compute_with(|_| async move {
            let catalog = fetch_catalog(pool, partner_id).await?;
            Ok::<_, AppError>(Op::Put(Arc::new(catalog)))
        })
        .await?;
    Ok(())
}

/// Cache lookup whose miss path runs under the entry's lock.
///
/// A rule replacement holds the same lock while it commits, so a loader that
/// read the old rows can never overwrite the new snapshot.
async fn cached_or_fetch<F>(
    cache: &AppCache,
    partner_id: Uuid,
    fetch: F,
) -> Result<Arc<PricingCatalog>, AppError>
where
    F: Future<Output = Result<PricingCatalog, AppError>>,
{
    if let Some(cached) = cache.catalogs.get(&partner_id).await {
        debug!("Cache HIT for pricing catalog: {}", partner_id);
        return Ok(cached);
    }
    debug!("Cache MISS for pricing catalog: {}", partner_id);

    let result = cache
        .catalogs
        .entry(partner_id)
        .and_try_compute_with(|entry| async move {
            // Filled by another task while we waited for the lock
            if entry.is_some() {
                return Ok(Op::Nop);
            }
            let catalog = fetch.await?;
            Ok::<_, AppError>(Op::Put(Arc::new(catalog)))
        })
        .await?;

    result
        .into_entry()
        .map(Entry::into_value)
        .ok_or_else(|| {
            AppError::Internal(format!("Pricing catalog for partner {} was not cached", partner_id))
        })
}

async fn fetch_catalog(pool: &PgPool, partner_id: Uuid) -> Result<PricingCatalog, AppError> {
    let rows = queries::get_partner_rules(pool, partner_id).await?;
    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        let rule_id = row.id;
        match PricingRule::try_from(row) {
            Ok(rule) => rules.push(rule),
            Err(e) => warn!("Skipping pricing rule {}: {}", rule_id, e),
        }
    }

    Ok(PricingCatalog::for_partner(partner_id, rules))
}

/// Quote a lead against a partner's catalog.
///
/// `Ok(None)` means the partner has not priced this combination.
pub async fn quote_for_partner(
    pool: &PgPool,
    cache: &AppCache,
    partner_id: Uuid,
    input: &LeadPricingInput,
) -> Result<Option<PriceQuote>, AppError> {
    let catalog = load_catalog(pool, cache, partner_id).await?;
    let quote = calculators::quote(&catalog, input);

    if quote.is_none() {
        info!(
            "No pricing rule for partner {} ({}/{}/{:?})",
            partner_id, input.pest_type, input.object_type, input.rooms
        );
    }

    Ok(quote)
}

/// Reject rule sets that would make resolution ambiguous.
pub fn validate_rule_set(rules: &[PricingRule]) -> Result<(), PricingError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert((rule.pest_type, rule.object_type, rule.variant)) {
            return Err(PricingError::DuplicateRule {
                pest_type: rule.pest_type,
                object_type: rule.object_type,
                variant: rule.variant,
            });
        }
    }
    Ok(())
}

/// Replace a partner's whole rule set and cache the committed catalog.
pub async fn replace_rules(
    pool: &PgPool,
    cache: &AppCache,
    partner_id: Uuid,
    rules: Vec<PricingRule>,
) -> Result<Vec<PricingRule>, AppError> {
    validate_rule_set(&rules)?;

    if let Some(foreign) = rules.iter().find(|r| r.partner_id != partner_id) {
        return Err(AppError::Validation(format!(
            "Rule {} belongs to partner {}, not {}",
            foreign.id, foreign.partner_id, partner_id
        )));
    }

    let catalog = Arc::new(PricingCatalog::for_partner(partner_id, rules.clone()));
    let pending = &rules;
    cache
        .catalogs
        .entry(partner_id)
        .and_try_compute_with(move |_| async move {
            queries::replace_partner_rules(pool, partner_id, pending).await?;
            Ok::<_, AppError>(Op::Put(catalog))
        })
        .await?;

    info!("Replaced {} pricing rules for partner {}", rules.len(), partner_id);
    Ok(rules)
}
