//! Per-partner pricing catalog.
//!
//! Built once per load from the partner's rules and shared read-only between
//! requests.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use super::models::{LeadPricingInput, ObjectType, PestType, PricingRule, Variant};
use super::resolver::{resolve_candidates, VariantPrice};

/// A partner's rules grouped by (pest, object)
#[derive(Debug, Clone, Default)]
pub struct PricingCatalog {
    partner_id: Uuid,
    entries: BTreeMap<(PestType, ObjectType), Vec<VariantPrice>>,
    rule_count: usize,
}

impl PricingCatalog {
    /// Build the catalog for `partner_id`.
    ///
    /// Rules owned by other partners are dropped. When a (pest, object,
    /// variant) appears twice the first rule is kept.
    pub fn for_partner(partner_id: Uuid, rules: impl IntoIterator<Item = PricingRule>) -> Self {
        let mut entries: BTreeMap<(PestType, ObjectType), Vec<VariantPrice>> = BTreeMap::new();
        let mut seen: HashSet<(PestType, ObjectType, Variant)> = HashSet::new();
        let mut rule_count = 0;

        for rule in rules {
            if rule.partner_id != partner_id {
                warn!(
                    "Skipping rule {} of partner {} while building catalog for {}",
                    rule.id, rule.partner_id, partner_id
                );
                continue;
            }
            if !seen.insert((rule.pest_type, rule.object_type, rule.variant)) {
                warn!(
                    "Duplicate pricing rule {} for {}/{}/{}; keeping the first",
                    rule.id, rule.pest_type, rule.object_type, rule.variant
                );
                continue;
            }

            entries
                .entry((rule.pest_type, rule.object_type))
                .or_default()
                .push(VariantPrice::from(&rule));
            rule_count += 1;
        }

        Self {
            partner_id,
            entries,
            rule_count,
        }
    }

    pub fn partner_id(&self) -> Uuid {
        self.partner_id
    }

    /// Number of rules that made it into the catalog
    pub fn len(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    /// Variant prices configured for one pest/object pair
    pub fn candidates(&self, pest_type: PestType, object_type: ObjectType) -> &[VariantPrice] {
        self.entries
            .get(&(pest_type, object_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve the base price for a lead; see [`super::resolver::resolve_price`].
    pub fn resolve(&self, input: &LeadPricingInput) -> Option<Decimal> {
        resolve_candidates(self.candidates(input.pest_type, input.object_type), input)
    }

    /// Pest/object pairs with at least one rule, in a stable order
    pub fn priced_combinations(&self) -> Vec<(PestType, ObjectType)> {
        self.entries.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::InfestationLevel;
    use crate::pricing::resolver::resolve_price;
    use rust_decimal_macros::dec;

    fn rule(
        partner_id: Uuid,
        pest_type: PestType,
        object_type: ObjectType,
        variant: Variant,
        base_price: Decimal,
    ) -> PricingRule {
        PricingRule::new(partner_id, pest_type, object_type, variant, base_price).unwrap()
    }

    #[test]
    fn test_catalog_drops_other_partners_rules() {
        let ours = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let rules = vec![
            rule(ours, PestType::Tarakany, ObjectType::House, Variant::Default, dec!(4000)),
            rule(theirs, PestType::Klopy, ObjectType::House, Variant::Default, dec!(100)),
        ];

        let catalog = PricingCatalog::for_partner(ours, rules);
        assert_eq!(catalog.partner_id(), ours);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.candidates(PestType::Klopy, ObjectType::House).is_empty());

        let input = LeadPricingInput {
            pest_type: PestType::Klopy,
            object_type: ObjectType::House,
            rooms: None,
            infestation_level: InfestationLevel::Low,
        };
        assert_eq!(catalog.resolve(&input), None);
    }

    #[test]
    fn test_catalog_keeps_first_duplicate() {
        let partner = Uuid::new_v4();
        let rules = vec![
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Rooms(1), dec!(2000)),
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Rooms(1), dec!(9000)),
        ];

        let catalog = PricingCatalog::for_partner(partner, rules);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.candidates(PestType::Tarakany, ObjectType::Apartment)[0].base_price,
            dec!(2000)
        );
    }

    #[test]
    fn test_catalog_agrees_with_list_resolution() {
        let partner = Uuid::new_v4();
        let rules = vec![
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Rooms(1), dec!(2000)),
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Rooms(3), dec!(3000)),
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Default, dec!(2700)),
            rule(partner, PestType::Tarakany, ObjectType::House, Variant::Default, dec!(4000)),
            rule(partner, PestType::Muravyi, ObjectType::Plot, Variant::Default, dec!(6000)),
        ];
        let catalog = PricingCatalog::for_partner(partner, rules.clone());

        for pest_type in PestType::ALL {
            for object_type in ObjectType::ALL {
                for rooms in [None, Some(1), Some(2), Some(3), Some(4), Some(7)] {
                    let input = LeadPricingInput {
                        pest_type,
                        object_type,
                        rooms,
                        infestation_level: InfestationLevel::Low,
                    };
                    assert_eq!(
                        catalog.resolve(&input),
                        resolve_price(&rules, &input),
                        "{:?}",
                        input
                    );
                }
            }
        }
    }

    #[test]
    fn test_priced_combinations_are_sorted() {
        let partner = Uuid::new_v4();
        let rules = vec![
            rule(partner, PestType::Muravyi, ObjectType::Plot, Variant::Default, dec!(6000)),
            rule(partner, PestType::Tarakany, ObjectType::House, Variant::Default, dec!(4000)),
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Rooms(1), dec!(2000)),
            rule(partner, PestType::Tarakany, ObjectType::Apartment, Variant::Rooms(2), dec!(2500)),
        ];
        let catalog = PricingCatalog::for_partner(partner, rules);

        assert_eq!(
            catalog.priced_combinations(),
            vec![
                (PestType::Tarakany, ObjectType::Apartment),
                (PestType::Tarakany, ObjectType::House),
                (PestType::Muravyi, ObjectType::Plot),
            ]
        );
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = PricingCatalog::for_partner(Uuid::new_v4(), Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.priced_combinations().is_empty());
    }
}
