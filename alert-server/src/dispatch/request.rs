//! Broadcast requests and the message composed from them.

use crate::filter::is_all_areas;
use crate::validation::{non_blank, ValidationError, BROADCAST_FIELDS_REQUIRED};

/// A single request to notify every recipient matching a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRequest {
    /// Issuing organization (e.g. hospital name)
    pub originator: String,
    /// Area tag or `"All"`
    pub area: String,
    /// Category tag or `"Any"`
    pub category: String,
    /// Free-text body, may be empty
    pub body: String,
}

impl BroadcastRequest {
    /// Build a request from raw intake fields, trimming them and rejecting
    /// a blank originator, area or category.
    pub fn new(
        originator: Option<&str>,
        area: Option<&str>,
        category: Option<&str>,
        body: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let (Some(originator), Some(area), Some(category)) =
            (non_blank(originator), non_blank(area), non_blank(category))
        else {
            return Err(ValidationError::MissingFields(BROADCAST_FIELDS_REQUIRED));
        };

        Ok(Self {
            originator: originator.to_string(),
            area: area.to_string(),
            category: category.to_string(),
            body: body.map(str::trim).unwrap_or_default().to_string(),
        })
    }

    /// Check a request that was built field by field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::new(
            Some(self.originator.as_str()),
            Some(self.area.as_str()),
            Some(self.category.as_str()),
            None,
        )
        .map(|_| ())
    }
}

/// Compose the outbound text. Identical for every recipient of a broadcast.
pub fn compose_message(request: &BroadcastRequest) -> String {
    let body = request.body.trim();
    let mut message = format!(
        "URGENT: Blood needed at {} in {}. Blood type: {}. ",
        request.originator, request.area, request.category
    );
    if !body.is_empty() {
        message.push_str(body);
        message.push(' ');
    }
    message.push_str("Please help if you can.");
    message
}

/// Human-readable reason for an empty match, naming the area unless it was
/// the all-areas wildcard.
pub fn no_match_message(area: &str) -> String {
    let location = if is_all_areas(area) {
        "in any area".to_string()
    } else {
        format!("in the {} area", area)
    };
    format!("No donors found with the required blood group {}.", location)
}
