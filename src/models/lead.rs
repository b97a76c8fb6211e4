//! Lead models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::{LeadPricingInput, PriceQuote};

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 2000;

/// Where a lead is in the partner's workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    InProgress,
    Scheduled,
    Completed,
    Cancelled,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::InProgress,
        LeadStatus::Scheduled,
        LeadStatus::Completed,
        LeadStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::InProgress => "in_progress",
            LeadStatus::Scheduled => "scheduled",
            LeadStatus::Completed => "completed",
            LeadStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Completed | LeadStatus::Cancelled)
    }

    /// Closed leads can be re-opened as in progress, never reset to new.
    pub fn can_transition_to(&self, next: LeadStatus) -> bool {
        !(self.is_terminal() && next == LeadStatus::New)
    }
}

impl FromStr for LeadStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| AppError::Validation(format!("Unknown lead status '{}'", s)))
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lead from the leads table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub pest_type: String,
    pub object_type: String,
    pub rooms: Option<i16>,
    pub infestation_level: String,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub base_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub final_price: Option<Decimal>,
    pub currency: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn status(&self) -> Result<LeadStatus, AppError> {
        self.status.parse()
    }
}

/// Validated lead ready to insert
#[derive(Debug, Clone)]
pub struct NewLead {
    pub partner_id: Uuid,
    pub customer_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub pricing: LeadPricingInput,
    pub quote: Option<PriceQuote>,
    pub currency: String,
}

impl NewLead {
    /// Validate raw contact fields and attach the pricing outcome.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        partner_id: Uuid,
        customer_name: &str,
        phone: &str,
        address: Option<&str>,
        comment: Option<&str>,
        pricing: LeadPricingInput,
        quote: Option<PriceQuote>,
        currency: &str,
    ) -> Result<Self, AppError> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(AppError::Validation("Customer name is required".to_string()));
        }
        if customer_name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::Validation(format!(
                "Customer name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        Ok(Self {
            partner_id,
            customer_name: customer_name.to_string(),
            phone: normalize_phone(phone)?,
            address: optional_text("address", address)?,
            comment: optional_text("comment", comment)?,
            pricing,
            quote,
            currency: currency.to_string(),
        })
    }
}

/// Trim free text, mapping blank to `None` and rejecting overlong input.
pub fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(Some(value.to_string()))
}

/// Normalize a phone number to `+` followed by digits.
///
/// Russian trunk-prefixed numbers (`8 9xx ...`) become `+7 9xx ...` and bare
/// ten-digit numbers get the `+7` country code.
pub fn normalize_phone(raw: &str) -> Result<String, AppError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let digits = match digits.len() {
        10 if !raw.trim_start().starts_with('+') => format!("7{}", digits),
        11 if digits.starts_with('8') => format!("7{}", &digits[1..]),
        _ => digits,
    };

    if !(10..=15).contains(&digits.len()) {
        return Err(AppError::Validation(format!("Invalid phone number '{}'", raw.trim())));
    }

    Ok(format!("+{}", digits))
}

/// Lead count for one status
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
