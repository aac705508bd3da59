//! Input validation for registration and broadcast intake.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::registry::Recipient;

/// Message for a registration with a missing or blank field.
pub const REGISTRATION_FIELDS_REQUIRED: &str = "All fields are required";

/// Message for a broadcast with a missing or blank required field.
pub const BROADCAST_FIELDS_REQUIRED: &str = "Hospital name, area, and blood group are required";

/// Malformed or missing request fields. Never causes state changes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Please enter a valid 10-digit Indian phone number (e.g., +919322659210)")]
    InvalidAddress,

    #[error("Unknown blood group: {0}")]
    UnknownCategory(String),
}

/// `+91` followed by exactly ten ASCII digits.
fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+91[0-9]{10}$").expect("Invalid address pattern"))
}

/// Whether an address satisfies the SMS transport's addressing format.
pub fn is_valid_address(address: &str) -> bool {
    address_pattern().is_match(address)
}

/// Trim a field, treating blank values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate registration fields and build the recipient to store.
///
/// Checks, in order: all fields present, address format, category membership.
pub fn validate_registration(
    name: Option<&str>,
    area: Option<&str>,
    address: Option<&str>,
    category: Option<&str>,
    allowed_categories: &[String],
) -> Result<Recipient, ValidationError> {
    let (Some(name), Some(area), Some(address), Some(category)) = (
        non_blank(name),
        non_blank(area),
        non_blank(address),
        non_blank(category),
    ) else {
        return Err(ValidationError::MissingFields(REGISTRATION_FIELDS_REQUIRED));
    };

    if !is_valid_address(address) {
        return Err(ValidationError::InvalidAddress);
    }

    if !allowed_categories.iter().any(|c| c == category) {
        return Err(ValidationError::UnknownCategory(category.to_string()));
    }

    Ok(Recipient::new(name, area, address, category))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blood_groups() -> Vec<String> {
        ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_valid_addresses() {
        assert!(is_valid_address("+919322659210"));
        assert!(is_valid_address("+910000000000"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_address("9322659210"));
        assert!(!is_valid_address("+91932265921"));
        assert!(!is_valid_address("+9193226592100"));
        assert!(!is_valid_address("+14155550100"));
        assert!(!is_valid_address("+91 9322659210"));
        // Non-ASCII digits must not pass
        assert!(!is_valid_address("+91९३२२६५९२१०"));
    }

    #[test]
    fn test_registration_ok_trims_fields() {
        let recipient = validate_registration(
            Some("  Asha "),
            Some("Andheri"),
            Some(" +919322659210"),
            Some("O+"),
            &blood_groups(),
        )
        .unwrap();

        assert_eq!(recipient.name, "Asha");
        assert_eq!(recipient.address, "+919322659210");
        assert_eq!(recipient.category, "O+");
    }

    #[test]
    fn test_registration_missing_field() {
        let err = validate_registration(
            Some("Asha"),
            Some("   "),
            Some("+919322659210"),
            Some("O+"),
            &blood_groups(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), REGISTRATION_FIELDS_REQUIRED);

        let err = validate_registration(None, None, None, None, &blood_groups()).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(REGISTRATION_FIELDS_REQUIRED));
    }

    #[test]
    fn test_registration_bad_phone() {
        let err = validate_registration(
            Some("Asha"),
            Some("Andheri"),
            Some("12345"),
            Some("O+"),
            &blood_groups(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidAddress);
    }

    #[test]
    fn test_registration_unknown_category() {
        let err = validate_registration(
            Some("Asha"),
            Some("Andheri"),
            Some("+919322659210"),
            Some("Z+"),
            &blood_groups(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("Z+".to_string()));
    }
}
