//! Database models shared by the partner and lead routes

pub mod lead;
pub mod partner;

pub use lead::{normalize_phone, optional_text, Lead, LeadStatus, NewLead, StatusCount};
pub use partner::{Partner, PartnerBranding};
