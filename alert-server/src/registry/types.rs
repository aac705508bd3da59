//! Recipient records and the query shape used to look them up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered donor able to receive alerts.
///
/// Serialized with the field names the public API has always used
/// (`phone`, `bloodGroup`), while the code speaks of addresses and categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Display name
    pub name: String,
    /// Area tag (open vocabulary)
    pub area: String,
    /// Transport address, unique within the registry
    #[serde(rename = "phone")]
    pub address: String,
    /// Category tag (closed vocabulary, e.g. blood group)
    #[serde(rename = "bloodGroup")]
    pub category: String,
    /// When the recipient registered
    pub created_at: DateTime<Utc>,
}

impl Recipient {
    /// Create a recipient stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        area: impl Into<String>,
        address: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            area: area.into(),
            address: address.into(),
            category: category.into(),
            created_at: Utc::now(),
        }
    }
}

/// Exact-match predicates over a recipient. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientQuery {
    pub area: Option<String>,
    pub category: Option<String>,
}

impl RecipientQuery {
    /// Query matching every recipient.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, recipient: &Recipient) -> bool {
        let area_ok = self.area.as_deref().map_or(true, |a| a == recipient.area);
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| c == recipient.category);
        area_ok && category_ok
    }
}

/// Ordering requested from [`RecipientRegistry::find`](super::RecipientRegistry::find).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Whatever order the engine produces
    #[default]
    Unspecified,
    /// Most recently created first
    NewestFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor(area: &str, category: &str) -> Recipient {
        Recipient::new("Asha", area, "+919876543210", category)
    }

    #[test]
    fn test_query_all_matches_everything() {
        assert!(RecipientQuery::all().matches(&donor("Andheri", "O+")));
        assert!(RecipientQuery::all().matches(&donor("Bandra", "AB-")));
    }

    #[test]
    fn test_query_exact_match() {
        let query = RecipientQuery {
            area: Some("Andheri".to_string()),
            category: Some("O+".to_string()),
        };
        assert!(query.matches(&donor("Andheri", "O+")));
        assert!(!query.matches(&donor("Andheri", "O-")));
        assert!(!query.matches(&donor("andheri", "O+")));
    }

    #[test]
    fn test_recipient_serializes_with_api_field_names() {
        let json = serde_json::to_value(donor("Andheri", "B+")).unwrap();
        assert_eq!(json["phone"], "+919876543210");
        assert_eq!(json["bloodGroup"], "B+");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("address").is_none());
    }
}
