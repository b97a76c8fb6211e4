//! Request DTOs for pricing API endpoints.
//!
//! Enum fields arrive as raw strings and are validated here, at the edge,
//! before anything reaches the resolver.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{LeadPricingInput, ObjectType, PricingRule, Variant};
use super::services::PricingError;

/// Request to quote a price
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub pest_type: String,
    pub object_type: String,
    #[serde(default)]
    pub rooms: Option<i64>,
    pub infestation_level: String,
}

impl QuoteRequest {
    /// Validate into the typed pricing input.
    ///
    /// Rooms only matter for apartments and are dropped for other objects.
    pub fn to_input(&self) -> Result<LeadPricingInput, PricingError> {
        let pest_type = self.pest_type.parse()?;
        let object_type: ObjectType = self.object_type.parse()?;
        let infestation_level = self.infestation_level.parse()?;

        let rooms = match (object_type, self.rooms) {
            (ObjectType::Apartment, Some(rooms)) => Some(
                u8::try_from(rooms)
                    .ok()
                    .filter(|r| *r > 0)
                    .ok_or(PricingError::InvalidRooms { rooms })?,
            ),
            _ => None,
        };

        Ok(LeadPricingInput {
            pest_type,
            object_type,
            rooms,
            infestation_level,
        })
    }
}

/// One rule in a rule-set replacement
#[derive(Debug, Clone, Deserialize)]
pub struct PricingRuleRequest {
    pub pest_type: String,
    pub object_type: String,
    #[serde(default = "default_variant")]
    pub variant: String,
    pub base_price: Decimal,
}

fn default_variant() -> String {
    "default".to_string()
}

impl PricingRuleRequest {
    pub fn to_rule(&self, partner_id: Uuid) -> Result<PricingRule, PricingError> {
        let pest_type = self.pest_type.parse()?;
        let object_type: ObjectType = self.object_type.parse()?;
        let variant = Variant::parse_for(object_type, &self.variant)?;
        PricingRule::new(partner_id, pest_type, object_type, variant, self.base_price)
    }
}

/// Request to replace a partner's rule set
#[derive(Debug, Deserialize)]
pub struct ReplaceRulesRequest {
    pub rules: Vec<PricingRuleRequest>,
}

impl ReplaceRulesRequest {
    pub fn to_rules(&self, partner_id: Uuid) -> Result<Vec<PricingRule>, PricingError> {
        self.rules.iter().map(|r| r.to_rule(partner_id)).collect()
    }
}
