//! Partner (tenant) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Partner from the partners table
#[derive(Debug, Clone, FromRow)]
pub struct Partner {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub phone: Option<String>,
    pub branding: serde_json::Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Look of a partner's intake form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerBranding {
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
}

impl Partner {
    /// Parse the stored branding JSON, falling back to an unbranded form
    pub fn branding(&self) -> PartnerBranding {
        serde_json::from_value(self.branding.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partner(branding: serde_json::Value) -> Partner {
        Partner {
            id: Uuid::new_v4(),
            slug: "dezinsekt".to_string(),
            name: "Дезинсект".to_string(),
            phone: None,
            branding,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_branding_parses_known_fields() {
        let p = partner(json!({ "primary_color": "#0a7", "headline": "Избавим за день" }));
        let branding = p.branding();
        assert_eq!(branding.primary_color.as_deref(), Some("#0a7"));
        assert_eq!(branding.logo_url, None);
        assert_eq!(branding.headline.as_deref(), Some("Избавим за день"));
    }

    #[test]
    fn test_malformed_branding_falls_back_to_default() {
        assert_eq!(partner(json!("oops")).branding(), PartnerBranding::default());
        assert_eq!(partner(json!({})).branding(), PartnerBranding::default());
    }
}
