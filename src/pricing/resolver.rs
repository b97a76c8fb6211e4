//! Base price resolution.
//!
//! Pure functions over a partner's rules. The lookup order is:
//! exact variant, nearest apartment room count, default tier, nothing.
//! Each step works on a candidate slice so the catalog and the plain
//! list entry point share them.

use rust_decimal::Decimal;

use super::models::{LeadPricingInput, ObjectType, PricingRule, Variant};

/// A rule reduced to what the lookup needs once pest and object match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPrice {
    pub variant: Variant,
    pub base_price: Decimal,
}

impl From<&PricingRule> for VariantPrice {
    fn from(rule: &PricingRule) -> Self {
        Self {
            variant: rule.variant,
            base_price: rule.base_price,
        }
    }
}

/// Resolve the base price for a lead from one partner's rules.
///
/// Rules for other pest/object combinations are ignored. `None` means the
/// partner has not priced this combination; it is not a price of zero.
pub fn resolve_price(rules: &[PricingRule], input: &LeadPricingInput) -> Option<Decimal> {
    let candidates: Vec<VariantPrice> = rules
        .iter()
        .filter(|r| r.pest_type == input.pest_type && r.object_type == input.object_type)
        .map(VariantPrice::from)
        .collect();

    resolve_candidates(&candidates, input)
}

/// Run the lookup steps over rules already matched on pest and object.
pub fn resolve_candidates(candidates: &[VariantPrice], input: &LeadPricingInput) -> Option<Decimal> {
    if let Some(price) = exact_match(candidates, input.target_variant()) {
        return Some(price);
    }

    if input.object_type == ObjectType::Apartment {
        if let Some(rooms) = input.rooms {
            if let Some(price) = nearest_rooms(candidates, rooms) {
                return Some(price);
            }
        }
    }

    default_price(candidates)
}

/// First candidate carrying exactly `target`
pub fn exact_match(candidates: &[VariantPrice], target: Variant) -> Option<Decimal> {
    candidates
        .iter()
        .find(|c| c.variant == target)
        .map(|c| c.base_price)
}

/// Closest room-count candidate to `rooms`.
///
/// Equidistant candidates resolve downwards: with rules for 1 and 3 rooms a
/// 2-room apartment gets the 1-room price. Among identical candidates the
/// first one wins.
pub fn nearest_rooms(candidates: &[VariantPrice], rooms: u8) -> Option<Decimal> {
    let mut best: Option<((u8, bool), Decimal)> = None;

    for candidate in candidates {
        let Some(variant_rooms) = candidate.variant.rooms() else {
            continue;
        };
        // (distance, is_not_below) orders closer first, then below-target first
        let key = (variant_rooms.abs_diff(rooms), variant_rooms >= rooms);
        match best {
            Some((best_key, _)) if best_key <= key => {}
            _ => best = Some((key, candidate.base_price)),
        }
    }

    best.map(|(_, price)| price)
}

/// The default tier, if the partner configured one
pub fn default_price(candidates: &[VariantPrice]) -> Option<Decimal> {
    exact_match(candidates, Variant::Default)
}
