//! Twilio Programmable Messaging transport.
//!
//! Sends SMS through the Twilio REST API and classifies failures:
//! - error code 21211 (invalid `To` number) is permanent
//! - any other API rejection is transient
//! - network errors, timeouts and unreadable responses are transport errors
//!
//! Reference: https://www.twilio.com/docs/api/errors/21211

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;

use super::{SendOutcome, TransportGateway};

/// Twilio error code for a `To` number that is not a valid phone number.
pub const INVALID_TO_NUMBER: u32 = 21211;

/// Twilio API version segment.
const API_VERSION: &str = "2010-04-01";

/// Credentials and sender identity for the Twilio account.
#[derive(Clone)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl fmt::Debug for TwilioSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioSettings")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .finish()
    }
}

/// Error body returned by the Twilio API on a rejected request.
#[derive(Debug, Deserialize)]
struct TwilioApiError {
    code: Option<u32>,
    #[serde(default)]
    message: String,
}

/// Accepted message resource (only the fields we log).
#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
    status: Option<String>,
}

/// Transport that delivers SMS through Twilio.
#[derive(Clone)]
pub struct TwilioGateway {
    client: Client,
    endpoint: Url,
    settings: TwilioSettings,
}

impl TwilioGateway {
    /// Build a gateway against `api_base` (normally `https://api.twilio.com`).
    ///
    /// `timeout` bounds each HTTP request.
    pub fn new(settings: TwilioSettings, api_base: &str, timeout: Duration) -> Result<Self> {
        let endpoint = messages_endpoint(api_base, &settings.account_sid)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            endpoint = %endpoint,
            from_number = %settings.from_number,
            timeout_ms = timeout.as_millis() as u64,
            "twilio_gateway_created"
        );

        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Build `{base}/2010-04-01/Accounts/{sid}/Messages.json`.
fn messages_endpoint(api_base: &str, account_sid: &str) -> Result<Url> {
    let mut url = Url::parse(api_base).context("Invalid Twilio API base URL")?;

    url.path_segments_mut()
        .map_err(|_| anyhow!("Twilio API base URL cannot be a base: {}", api_base))?
        .pop_if_empty()
        .extend([API_VERSION, "Accounts", account_sid, "Messages.json"]);

    Ok(url)
}

/// Map a Twilio API rejection to an outcome.
fn classify_rejection(status: u16, api_error: Option<TwilioApiError>) -> SendOutcome {
    match api_error {
        Some(TwilioApiError {
            code: Some(INVALID_TO_NUMBER),
            message,
        }) => SendOutcome::permanent(format!("{}: {}", INVALID_TO_NUMBER, message)),
        Some(TwilioApiError {
            code: Some(code),
            message,
        }) => SendOutcome::transient(format!("{}: {}", code, message)),
        Some(TwilioApiError { code: None, message }) if !message.is_empty() => {
            SendOutcome::transient(format!("HTTP {}: {}", status, message))
        }
        _ => SendOutcome::transient(format!("HTTP {}", status)),
    }
}

#[async_trait]
impl TransportGateway for TwilioGateway {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        let form = [
            ("To", to),
            ("From", self.settings.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&form)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let status = resp.status().as_u16();
                let message = resp.json::<TwilioMessage>().await.ok();

                info!(
                    to = %to,
                    status_code = status,
                    message_sid = ?message.as_ref().and_then(|m| m.sid.as_deref()),
                    message_status = ?message.as_ref().and_then(|m| m.status.as_deref()),
                    "twilio_send_accepted"
                );

                SendOutcome::delivered()
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                let api_error = resp.json::<TwilioApiError>().await.ok();
                let outcome = classify_rejection(status, api_error);

                warn!(
                    to = %to,
                    status_code = status,
                    kind = ?outcome.kind,
                    detail = ?outcome.detail,
                    "twilio_send_rejected"
                );

                outcome
            }
            Err(e) => {
                if e.is_timeout() {
                    error!(to = %to, error = %e, "twilio_send_timeout");
                    SendOutcome::transport_error(format!("timed out: {}", e))
                } else if e.is_connect() {
                    error!(to = %to, error = %e, "twilio_send_connect_error");
                    SendOutcome::transport_error(format!("connection failed: {}", e))
                } else {
                    error!(to = %to, error = %e, "twilio_send_error");
                    SendOutcome::transport_error(e.to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::OutcomeKind;

    #[test]
    fn test_messages_endpoint() {
        let url = messages_endpoint("https://api.twilio.com", "AC123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );

        let url = messages_endpoint("http://127.0.0.1:8080/", "AC123").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_messages_endpoint_invalid_base() {
        assert!(messages_endpoint("not a url", "AC123").is_err());
        assert!(messages_endpoint("mailto:ops@example.com", "AC123").is_err());
    }

    #[test]
    fn test_classify_invalid_number_is_permanent() {
        let outcome = classify_rejection(
            400,
            Some(TwilioApiError {
                code: Some(21211),
                message: "The 'To' number is not a valid phone number.".to_string(),
            }),
        );
        assert_eq!(outcome.kind, OutcomeKind::RejectedPermanent);
        assert!(outcome.detail.unwrap().starts_with("21211"));
    }

    #[test]
    fn test_classify_other_codes_are_transient() {
        let outcome = classify_rejection(
            429,
            Some(TwilioApiError {
                code: Some(20429),
                message: "Too Many Requests".to_string(),
            }),
        );
        assert_eq!(outcome.kind, OutcomeKind::RejectedTransient);

        let outcome = classify_rejection(503, None);
        assert_eq!(outcome.kind, OutcomeKind::RejectedTransient);
        assert_eq!(outcome.detail.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_settings_debug_redacts_token() {
        let settings = TwilioSettings {
            account_sid: "AC123".to_string(),
            auth_token: "super-secret".to_string(),
            from_number: "+15005550006".to_string(),
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("AC123"));
    }
}
