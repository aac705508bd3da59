//! Configuration module for environment variable parsing.
//!
//! All configuration comes from environment variables, with defaults for
//! everything except credentials.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::transport::TwilioSettings;

/// Blood groups accepted at registration when `ALLOWED_CATEGORIES` is unset.
pub const DEFAULT_CATEGORIES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Default Twilio REST API base URL.
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Twilio credentials; `None` when any of them is missing
    pub twilio: Option<TwilioSettings>,

    /// Base URL of the Twilio REST API
    pub twilio_api_base: String,

    /// Shared secret required to send alerts
    pub alert_password: Option<String>,

    /// Upper bound on a single SMS send in milliseconds
    pub send_timeout_ms: u64,

    /// Maximum number of sends in flight per broadcast
    pub dispatch_concurrency: usize,

    /// Categories accepted at registration
    pub allowed_categories: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_number::<u16>("PORT", 3000),

            twilio: twilio_from_env(),

            twilio_api_base: non_empty_var("TWILIO_API_BASE")
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),

            alert_password: secret_var("HOSPITAL_ALERT_PASSWORD"),

            send_timeout_ms: parse_number::<u64>("SEND_TIMEOUT_MS", 10_000),

            dispatch_concurrency: parse_number::<usize>("DISPATCH_CONCURRENCY", 16).max(1),

            allowed_categories: parse_csv("ALLOWED_CATEGORIES")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Read Twilio credentials. All three must be present.
fn twilio_from_env() -> Option<TwilioSettings> {
    let account_sid = non_empty_var("TWILIO_ACCOUNT_SID");
    let auth_token = non_empty_var("TWILIO_AUTH_TOKEN");
    let from_number = non_empty_var("TWILIO_PHONE_NUMBER");

    match (account_sid, auth_token, from_number) {
        (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioSettings {
            account_sid,
            auth_token,
            from_number,
        }),
        (None, None, None) => None,
        (sid, token, from) => {
            warn!(
                has_account_sid = sid.is_some(),
                has_auth_token = token.is_some(),
                has_phone_number = from.is_some(),
                "twilio_config_incomplete"
            );
            None
        }
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a secret verbatim. Blank values are unset; anything else is kept
/// byte for byte, surrounding whitespace included.
fn secret_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric variable, falling back to the default when unset or malformed.
fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_valid() {
        env::set_var("TEST_DONOR_NUMBER", " 250 ");
        assert_eq!(parse_number::<u64>("TEST_DONOR_NUMBER", 10), 250);
        env::remove_var("TEST_DONOR_NUMBER");
    }

    #[test]
    fn test_parse_number_invalid_uses_default() {
        env::set_var("TEST_DONOR_BAD_NUMBER", "lots");
        assert_eq!(parse_number::<u16>("TEST_DONOR_BAD_NUMBER", 3000), 3000);
        env::remove_var("TEST_DONOR_BAD_NUMBER");
    }

    #[test]
    fn test_parse_number_default() {
        assert_eq!(parse_number::<usize>("NONEXISTENT_DONOR_VAR", 16), 16);
    }

    #[test]
    fn test_parse_csv() {
        env::set_var("TEST_DONOR_CSV", "A+, B+ ,, O-");
        let result = parse_csv("TEST_DONOR_CSV");
        assert_eq!(
            result,
            Some(vec!["A+".to_string(), "B+".to_string(), "O-".to_string()])
        );
        env::remove_var("TEST_DONOR_CSV");
    }

    #[test]
    fn test_non_empty_var_blank_is_unset() {
        env::set_var("TEST_DONOR_BLANK", "   ");
        assert_eq!(non_empty_var("TEST_DONOR_BLANK"), None);
        env::remove_var("TEST_DONOR_BLANK");
    }

    #[test]
    fn test_secret_var_is_not_trimmed() {
        env::set_var("TEST_DONOR_SECRET", " pw ");
        assert_eq!(secret_var("TEST_DONOR_SECRET").as_deref(), Some(" pw "));
        env::set_var("TEST_DONOR_SECRET", " \t ");
        assert_eq!(secret_var("TEST_DONOR_SECRET"), None);
        env::remove_var("TEST_DONOR_SECRET");
    }

    #[test]
    fn test_default_categories() {
        assert_eq!(DEFAULT_CATEGORIES.len(), 8);
        assert!(DEFAULT_CATEGORIES.contains(&"AB-"));
    }
}
