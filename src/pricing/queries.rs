//! Database queries for the pricing rule store.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{PricingRule, PricingRuleRow};

/// All rules of one partner, in a stable order
pub async fn get_partner_rules(
    pool: &PgPool,
    partner_id: Uuid,
) -> Result<Vec<PricingRuleRow>, AppError> {
    let rules = sqlx::query_as::<_, PricingRuleRow>(
        r#"
        SELECT
            id, partner_id, pest_type, object_type,
            variant, base_price, updated_at
        FROM pricing_rules
        WHERE partner_id = $1
        ORDER BY pest_type, object_type, variant, created_at
        "#,
    )
    .bind(partner_id)
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

/// Swap a partner's rule set atomically
pub async fn replace_partner_rules(
    pool: &PgPool,
    partner_id: Uuid,
    rules: &[PricingRule],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM pricing_rules
        WHERE partner_id = $1
        "#,
    )
    .bind(partner_id)
    .execute(&mut *tx)
    .await?;

    for rule in rules {
        sqlx::query(
            r#"
            INSERT INTO pricing_rules
                (id, partner_id, pest_type, object_type, variant, base_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(rule.id)
        .bind(partner_id)
        .bind(rule.pest_type.as_str())
        .bind(rule.object_type.as_str())
        .bind(rule.variant.to_string())
        .bind(rule.base_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}
