//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::catalog::PricingCatalog;
use super::models::{InfestationLevel, LeadPricingInput};

/// Quoted prices are always a multiple of this amount.
pub const PRICE_ROUNDING_STEP: Decimal = dec!(50);

impl InfestationLevel {
    /// Fixed price multiplier for the severity
    pub fn multiplier(&self) -> Decimal {
        match self {
            InfestationLevel::Low => dec!(1.00),
            InfestationLevel::Medium => dec!(1.15),
            InfestationLevel::High => dec!(1.30),
        }
    }
}

/// Round to the nearest multiple of `step`, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use pest_crm::pricing::round_to_step;
///
/// assert_eq!(round_to_step(dec!(2875), dec!(50)), dec!(2900));
/// assert_eq!(round_to_step(dec!(2860), dec!(50)), dec!(2850));
/// ```
pub fn round_to_step(amount: Decimal, step: Decimal) -> Decimal {
    if step.is_zero() {
        return amount;
    }
    let steps = (amount / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (steps * step).normalize()
}

/// Apply the severity multiplier to a base price and round for display.
///
/// `final = round(base * multiplier / 50) * 50`
pub fn calculate_final_price(base_price: Decimal, infestation_level: InfestationLevel) -> Decimal {
    round_to_step(base_price * infestation_level.multiplier(), PRICE_ROUNDING_STEP)
}

/// A resolved price ready to show a customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub base_price: Decimal,
    pub final_price: Decimal,
    pub multiplier: Decimal,
    pub infestation_level: InfestationLevel,
}

/// Resolve and scale a price in one go.
///
/// `None` when the partner has no applicable rule.
pub fn quote(catalog: &PricingCatalog, input: &LeadPricingInput) -> Option<PriceQuote> {
    let base_price = catalog.resolve(input)?;
    Some(PriceQuote {
        base_price,
        final_price: calculate_final_price(base_price, input.infestation_level),
        multiplier: input.infestation_level.multiplier(),
        infestation_level: input.infestation_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{ObjectType, PestType, PricingRule, Variant};
    use uuid::Uuid;

    // ==================== round_to_step tests ====================

    #[test]
    fn test_round_to_step_half_away_from_zero() {
        assert_eq!(round_to_step(dec!(2875), dec!(50)), dec!(2900));
        assert_eq!(round_to_step(dec!(25), dec!(50)), dec!(50));
        assert_eq!(round_to_step(dec!(75), dec!(50)), dec!(100));
        assert_eq!(round_to_step(dec!(-25), dec!(50)), dec!(-50));
    }

    #[test]
    fn test_round_to_step_normal_rounding() {
        assert_eq!(round_to_step(dec!(2874.99), dec!(50)), dec!(2850));
        assert_eq!(round_to_step(dec!(2860), dec!(50)), dec!(2850));
        assert_eq!(round_to_step(dec!(24), dec!(50)), dec!(0));
        assert_eq!(round_to_step(dec!(5200), dec!(50)), dec!(5200));
    }

    #[test]
    fn test_round_to_step_zero_step_is_identity() {
        assert_eq!(round_to_step(dec!(123.45), Decimal::ZERO), dec!(123.45));
    }

    // ==================== calculate_final_price tests ====================

    #[test]
    fn test_low_infestation_keeps_base_price() {
        assert_eq!(calculate_final_price(dec!(2500), InfestationLevel::Low), dec!(2500));
    }

    #[test]
    fn test_medium_infestation_rounds_up_at_midpoint() {
        // 2500 * 1.15 = 2875
        assert_eq!(calculate_final_price(dec!(2500), InfestationLevel::Medium), dec!(2900));
    }

    #[test]
    fn test_high_infestation() {
        // 4000 * 1.30 = 5200
        assert_eq!(calculate_final_price(dec!(4000), InfestationLevel::High), dec!(5200));
        // 2000 * 1.30 = 2600
        assert_eq!(calculate_final_price(dec!(2000), InfestationLevel::High), dec!(2600));
        // 1990 * 1.30 = 2587 -> 2600
        assert_eq!(calculate_final_price(dec!(1990), InfestationLevel::High), dec!(2600));
    }

    #[test]
    fn test_zero_base_price() {
        assert_eq!(calculate_final_price(Decimal::ZERO, InfestationLevel::High), Decimal::ZERO);
    }

    #[test]
    fn test_final_price_is_always_multiple_of_step() {
        for base in (0..20_000).step_by(37) {
            for level in InfestationLevel::ALL {
                let price = calculate_final_price(Decimal::from(base), level);
                assert!(
                    (price % PRICE_ROUNDING_STEP).is_zero(),
                    "{} at {:?} gave {}",
                    base,
                    level,
                    price
                );
                assert!(price >= Decimal::ZERO);
            }
        }
    }

    // ==================== quote tests ====================

    #[test]
    fn test_quote_combines_resolution_and_multiplier() {
        let partner = Uuid::new_v4();
        let rules = vec![PricingRule::new(
            partner,
            PestType::Tarakany,
            ObjectType::Apartment,
            Variant::Rooms(2),
            dec!(2500),
        )
        .unwrap()];
        let catalog = PricingCatalog::for_partner(partner, rules);

        let input = LeadPricingInput {
            pest_type: PestType::Tarakany,
            object_type: ObjectType::Apartment,
            rooms: Some(3),
            infestation_level: InfestationLevel::Medium,
        };
        let quote = quote(&catalog, &input).unwrap();
        assert_eq!(quote.base_price, dec!(2500));
        assert_eq!(quote.final_price, dec!(2900));
        assert_eq!(quote.multiplier, dec!(1.15));
    }

    #[test]
    fn test_quote_is_none_without_rule() {
        let catalog = PricingCatalog::for_partner(Uuid::new_v4(), vec![]);
        let input = LeadPricingInput {
            pest_type: PestType::Klopy,
            object_type: ObjectType::Apartment,
            rooms: Some(1),
            infestation_level: InfestationLevel::Low,
        };
        assert_eq!(quote(&catalog, &input), None);
    }
}
