//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::PriceQuote;
use super::models::{InfestationLevel, ObjectType, PestType, PricingRule, Variant};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Priced quote details
#[derive(Debug, Serialize)]
pub struct QuoteDetailsResponse {
    pub base_price: MoneyResponse,
    pub final_price: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub multiplier: Decimal,
    pub infestation_level: InfestationLevel,
}

impl QuoteDetailsResponse {
    pub fn from_quote(quote: &PriceQuote, currency: &str) -> Self {
        Self {
            base_price: MoneyResponse::new(quote.base_price, currency),
            final_price: MoneyResponse::new(quote.final_price, currency),
            multiplier: quote.multiplier,
            infestation_level: quote.infestation_level,
        }
    }
}

/// Response for a quote request.
///
/// `available: false` means the partner has not priced the combination.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteDetailsResponse>,
}

impl QuoteResponse {
    pub fn new(quote: Option<&PriceQuote>, currency: &str) -> Self {
        Self {
            available: quote.is_some(),
            quote: quote.map(|q| QuoteDetailsResponse::from_quote(q, currency)),
        }
    }
}

/// A stored pricing rule
#[derive(Debug, Serialize)]
pub struct PricingRuleResponse {
    pub id: Uuid,
    pub pest_type: PestType,
    pub object_type: ObjectType,
    pub variant: Variant,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
}

impl From<&PricingRule> for PricingRuleResponse {
    fn from(rule: &PricingRule) -> Self {
        Self {
            id: rule.id,
            pest_type: rule.pest_type,
            object_type: rule.object_type,
            variant: rule.variant,
            base_price: rule.base_price,
        }
    }
}

/// Response listing a partner's rules
#[derive(Debug, Serialize)]
pub struct PricingRulesResponse {
    pub partner_id: Uuid,
    pub currency: String,
    pub rules: Vec<PricingRuleResponse>,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
