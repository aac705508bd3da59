//! Shared-secret verification for alert senders.
//!
//! The configured password is never compared directly. Both the expected
//! password and the candidate are run through HMAC-SHA256 under a key drawn
//! at startup, and the tags are compared with `Mac::verify_slice`, which is
//! constant time. Neither the length nor the content of the password leaks
//! through timing.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// The alert password, held only as a keyed digest.
pub struct SharedSecret {
    key: [u8; 32],
    expected_tag: Option<Vec<u8>>,
}

impl SharedSecret {
    /// Wrap the configured password. A missing or blank password means every
    /// verification fails.
    pub fn new(password: Option<&str>) -> Self {
        let key: [u8; 32] = rand::thread_rng().gen();
        let expected_tag = password
            .filter(|p| !p.trim().is_empty())
            .and_then(|p| tag(&key, p));

        Self { key, expected_tag }
    }

    /// Whether a password was configured at all.
    pub fn is_configured(&self) -> bool {
        self.expected_tag.is_some()
    }

    /// Check a candidate password.
    pub fn verify(&self, candidate: &str) -> bool {
        let Some(expected) = self.expected_tag.as_deref() else {
            warn!("alert_password_not_configured");
            return false;
        };

        if candidate.is_empty() {
            return false;
        }

        match HmacSha256::new_from_slice(&self.key) {
            Ok(mut mac) => {
                mac.update(candidate.as_bytes());
                mac.verify_slice(expected).is_ok()
            }
            Err(_) => {
                warn!("alert_password_invalid_key");
                false
            }
        }
    }
}

fn tag(key: &[u8], value: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(value.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}
