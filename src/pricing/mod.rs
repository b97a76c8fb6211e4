//! Pricing engine module.
//!
//! Resolves a partner's base price for a lead from its rule table and scales
//! it by infestation severity. The resolver and calculator are pure; the
//! services layer adds caching and the rule store.

pub mod calculators;
pub mod catalog;
pub mod models;
pub mod queries;
pub mod requests;
pub mod resolver;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_final_price, quote, round_to_step, PriceQuote, PRICE_ROUNDING_STEP};
pub use catalog::PricingCatalog;
pub use models::{InfestationLevel, LeadPricingInput, ObjectType, PestType, PricingRule, Variant};
pub use resolver::resolve_price;
pub use routes::router;
pub use services::PricingError;
