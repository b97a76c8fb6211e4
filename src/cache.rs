//! In-memory caching using moka
//!
//! Holds partner profiles and their pricing catalogs. Catalogs only change
//! when a partner edits its rules, which stores the committed snapshot
//! directly.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::queries;
use crate::models::Partner;
use crate::pricing::services::refresh_catalog;
use crate::pricing::PricingCatalog;

/// Application cache holding partners and pricing catalogs
#[derive(Clone)]
pub struct AppCache {
    /// Active partners (slug -> Partner)
    pub partners: Cache<String, Arc<Partner>>,
    /// Pricing catalogs (partner id -> catalog snapshot)
    pub catalogs: Cache<Uuid, Arc<PricingCatalog>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Partners: 1000 entries, 30 min TTL, 10 min idle
            partners: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),

            // Catalogs: 1000 entries, 10 min TTL, 5 min idle
            catalogs: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(10 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            partners_size: self.partners.entry_count(),
            catalogs_size: self.catalogs.entry_count(),
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub partners_size: u64,
    pub catalogs_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Load every active partner and its catalog
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    let partners = match queries::get_active_partners(db).await {
        Ok(partners) => partners,
        Err(e) => {
            warn!("Failed to warm partner cache: {}", e);
            return;
        }
    };

    for partner in partners {
        if let Err(e) = refresh_catalog(db, cache, partner.id).await {
            warn!("Failed to warm catalog for partner {}: {}", partner.slug, e);
        }
        cache
            .partners
            .insert(partner.slug.clone(), Arc::new(partner))
            .await;
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_count_cached_catalogs() {
        let cache = AppCache::new();
        let partner_id = Uuid::new_v4();
        cache
            .catalogs
            .insert(partner_id, Arc::new(PricingCatalog::for_partner(partner_id, vec![])))
            .await;
        cache.catalogs.run_pending_tasks().await;

        let stats = cache.stats();
        assert_eq!(stats.catalogs_size, 1);
        assert_eq!(stats.partners_size, 0);
    }
}
