//! Pricing domain types and their database rows.
//!
//! Rows come out of Postgres string-typed; `TryFrom<PricingRuleRow>` is the
//! only way into the typed domain, so every rule the resolver sees is valid.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

use super::services::PricingError;

/// Highest room count a partner can price explicitly.
pub const MAX_RULE_ROOMS: u8 = 4;

/// Pest category a lead asks to treat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PestType {
    Tarakany,
    Klopy,
    Muravyi,
    Gryzuny,
    Blohi,
    Kleschi,
    Plesen,
}

impl PestType {
    pub const ALL: [PestType; 7] = [
        PestType::Tarakany,
        PestType::Klopy,
        PestType::Muravyi,
        PestType::Gryzuny,
        PestType::Blohi,
        PestType::Kleschi,
        PestType::Plesen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PestType::Tarakany => "tarakany",
            PestType::Klopy => "klopy",
            PestType::Muravyi => "muravyi",
            PestType::Gryzuny => "gryzuny",
            PestType::Blohi => "blohi",
            PestType::Kleschi => "kleschi",
            PestType::Plesen => "plesen",
        }
    }

    /// Label shown on intake forms
    pub fn label(&self) -> &'static str {
        match self {
            PestType::Tarakany => "Тараканы",
            PestType::Klopy => "Клопы",
            PestType::Muravyi => "Муравьи",
            PestType::Gryzuny => "Грызуны",
            PestType::Blohi => "Блохи",
            PestType::Kleschi => "Клещи",
            PestType::Plesen => "Плесень",
        }
    }
}

impl FromStr for PestType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PestType::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| PricingError::UnknownValue {
                field: "pest_type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of premises to be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Apartment,
    House,
    Plot,
    Commercial,
}

impl ObjectType {
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Apartment,
        ObjectType::House,
        ObjectType::Plot,
        ObjectType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Apartment => "apartment",
            ObjectType::House => "house",
            ObjectType::Plot => "plot",
            ObjectType::Commercial => "commercial",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectType::Apartment => "Квартира",
            ObjectType::House => "Дом",
            ObjectType::Plot => "Участок",
            ObjectType::Commercial => "Коммерческий объект",
        }
    }
}

impl FromStr for ObjectType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|o| o.as_str() == s.trim())
            .ok_or_else(|| PricingError::UnknownValue {
                field: "object_type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity estimate that scales the base price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfestationLevel {
    Low,
    Medium,
    High,
}

impl InfestationLevel {
    pub const ALL: [InfestationLevel; 3] = [
        InfestationLevel::Low,
        InfestationLevel::Medium,
        InfestationLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfestationLevel::Low => "low",
            InfestationLevel::Medium => "medium",
            InfestationLevel::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InfestationLevel::Low => "Низкая",
            InfestationLevel::Medium => "Средняя",
            InfestationLevel::High => "Высокая",
        }
    }
}

impl FromStr for InfestationLevel {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InfestationLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == s.trim())
            .ok_or_else(|| PricingError::UnknownValue {
                field: "infestation_level",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for InfestationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule tier: an explicit apartment room count, or the single default tier.
///
/// Serialized as `"1"`..`"4"` or `"default"`, the form partners edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Rooms(u8),
    Default,
}

impl Variant {
    /// Parse a rule variant and check it is legal for the object type.
    ///
    /// Room counts are only allowed for apartments and must lie in
    /// `1..=MAX_RULE_ROOMS`.
    pub fn parse_for(object_type: ObjectType, raw: &str) -> Result<Self, PricingError> {
        let raw = raw.trim();
        if raw == "default" {
            return Ok(Variant::Default);
        }

        let variant = raw
            .parse::<u8>()
            .map(Variant::Rooms)
            .map_err(|_| PricingError::InvalidVariant {
                object_type,
                variant: raw.to_string(),
            })?;
        variant.check_for(object_type)?;
        Ok(variant)
    }

    /// Check the variant is legal for a rule on `object_type`.
    pub fn check_for(&self, object_type: ObjectType) -> Result<(), PricingError> {
        let legal = match self {
            Variant::Default => true,
            Variant::Rooms(rooms) => {
                object_type == ObjectType::Apartment && (1..=MAX_RULE_ROOMS).contains(rooms)
            }
        };
        if legal {
            Ok(())
        } else {
            Err(PricingError::InvalidVariant {
                object_type,
                variant: self.to_string(),
            })
        }
    }

    pub fn rooms(&self) -> Option<u8> {
        match self {
            Variant::Rooms(n) => Some(*n),
            Variant::Default => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Rooms(n) => write!(f, "{}", n),
            Variant::Default => f.write_str("default"),
        }
    }
}

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One partner's price for one (pest, object, variant) combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingRule {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub pest_type: PestType,
    pub object_type: ObjectType,
    pub variant: Variant,
    pub base_price: Decimal,
}

impl PricingRule {
    /// Build a rule, checking the variant fits the object type and the base
    /// price is a non-negative whole amount.
    pub fn new(
        partner_id: Uuid,
        pest_type: PestType,
        object_type: ObjectType,
        variant: Variant,
        base_price: Decimal,
    ) -> Result<Self, PricingError> {
        variant.check_for(object_type)?;
        let id = Uuid::new_v4();
        validate_base_price(&id.to_string(), base_price)?;
        Ok(Self {
            id,
            partner_id,
            pest_type,
            object_type,
            variant,
            base_price,
        })
    }
}

fn validate_base_price(rule_id: &str, base_price: Decimal) -> Result<(), PricingError> {
    if base_price.is_sign_negative() && !base_price.is_zero() {
        return Err(PricingError::InvalidRule {
            rule_id: rule_id.to_string(),
            message: format!("base price {} is negative", base_price),
        });
    }
    if !base_price.fract().is_zero() {
        return Err(PricingError::InvalidRule {
            rule_id: rule_id.to_string(),
            message: format!("base price {} is not a whole amount", base_price),
        });
    }
    Ok(())
}

/// Lead attributes that drive the price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadPricingInput {
    pub pest_type: PestType,
    pub object_type: ObjectType,
    pub rooms: Option<u8>,
    pub infestation_level: InfestationLevel,
}

impl LeadPricingInput {
    /// Variant a rule must carry to match this input exactly.
    ///
    /// Only apartments look at `rooms`.
    pub fn target_variant(&self) -> Variant {
        match (self.object_type, self.rooms) {
            (ObjectType::Apartment, Some(rooms)) => Variant::Rooms(rooms),
            _ => Variant::Default,
        }
    }
}

/// Row from pricing_rules
#[derive(Debug, Clone, FromRow)]
pub struct PricingRuleRow {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub pest_type: String,
    pub object_type: String,
    pub variant: String,
    pub base_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PricingRuleRow> for PricingRule {
    type Error = PricingError;

    fn try_from(row: PricingRuleRow) -> Result<Self, Self::Error> {
        let pest_type = row.pest_type.parse()?;
        let object_type: ObjectType = row.object_type.parse()?;
        let variant = Variant::parse_for(object_type, &row.variant)?;
        validate_base_price(&row.id.to_string(), row.base_price)?;

        Ok(PricingRule {
            id: row.id,
            partner_id: row.partner_id,
            pest_type,
            object_type,
            variant,
            base_price: row.base_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_enums_parse_their_wire_slugs() {
        for pest in PestType::ALL {
            assert_eq!(pest.as_str().parse::<PestType>().unwrap(), pest);
        }
        for object in ObjectType::ALL {
            assert_eq!(object.as_str().parse::<ObjectType>().unwrap(), object);
        }
        assert_eq!(" high ".parse::<InfestationLevel>().unwrap(), InfestationLevel::High);
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        let err = "cockroach".parse::<PestType>().unwrap_err();
        assert!(matches!(err, PricingError::UnknownValue { field: "pest_type", .. }));

        let err = "extreme".parse::<InfestationLevel>().unwrap_err();
        assert!(matches!(
            err,
            PricingError::UnknownValue { field: "infestation_level", .. }
        ));

        assert!("Apartment".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!(
            Variant::parse_for(ObjectType::Apartment, "2").unwrap(),
            Variant::Rooms(2)
        );
        assert_eq!(
            Variant::parse_for(ObjectType::Apartment, "default").unwrap(),
            Variant::Default
        );
        assert_eq!(
            Variant::parse_for(ObjectType::House, "default").unwrap(),
            Variant::Default
        );

        // Room counts outside 1..=4 and room counts on non-apartments
        assert!(Variant::parse_for(ObjectType::Apartment, "0").is_err());
        assert!(Variant::parse_for(ObjectType::Apartment, "5").is_err());
        assert!(Variant::parse_for(ObjectType::Apartment, "two").is_err());
        assert!(Variant::parse_for(ObjectType::House, "2").is_err());
    }

    #[test]
    fn test_rule_constructor_rejects_illegal_variants() {
        let partner = Uuid::new_v4();
        let build = |object_type, variant| {
            PricingRule::new(partner, PestType::Klopy, object_type, variant, dec!(1000))
        };

        assert!(build(ObjectType::Apartment, Variant::Rooms(4)).is_ok());
        assert!(build(ObjectType::Commercial, Variant::Default).is_ok());

        for (object_type, variant) in [
            (ObjectType::Apartment, Variant::Rooms(0)),
            (ObjectType::Apartment, Variant::Rooms(9)),
            (ObjectType::House, Variant::Rooms(2)),
        ] {
            let err = build(object_type, variant).unwrap_err();
            assert!(matches!(err, PricingError::InvalidVariant { .. }));
            assert_eq!(err.field(), Some("variant"));
        }
    }

    #[test]
    fn test_variant_display_round_trips_wire_form() {
        assert_eq!(Variant::Rooms(3).to_string(), "3");
        assert_eq!(Variant::Default.to_string(), "default");
        assert_eq!(serde_json::to_string(&Variant::Rooms(1)).unwrap(), "\"1\"");
    }

    #[test]
    fn test_target_variant_ignores_rooms_outside_apartments() {
        let mut input = LeadPricingInput {
            pest_type: PestType::Tarakany,
            object_type: ObjectType::Apartment,
            rooms: Some(2),
            infestation_level: InfestationLevel::Low,
        };
        assert_eq!(input.target_variant(), Variant::Rooms(2));

        input.rooms = None;
        assert_eq!(input.target_variant(), Variant::Default);

        input.object_type = ObjectType::House;
        input.rooms = Some(3);
        assert_eq!(input.target_variant(), Variant::Default);
    }

    #[test]
    fn test_rule_row_conversion() {
        let row = PricingRuleRow {
            id: Uuid::new_v4(),
            partner_id: Uuid::new_v4(),
            pest_type: "tarakany".to_string(),
            object_type: "apartment".to_string(),
            variant: "2".to_string(),
            base_price: dec!(2500),
            updated_at: Utc::now(),
        };
        let rule = PricingRule::try_from(row.clone()).unwrap();
        assert_eq!(rule.variant, Variant::Rooms(2));
        assert_eq!(rule.base_price, dec!(2500));

        let bad = PricingRuleRow {
            base_price: dec!(-1),
            ..row.clone()
        };
        assert!(matches!(
            PricingRule::try_from(bad),
            Err(PricingError::InvalidRule { .. })
        ));

        let fractional = PricingRuleRow {
            base_price: dec!(99.5),
            ..row
        };
        assert!(PricingRule::try_from(fractional).is_err());
    }
}
