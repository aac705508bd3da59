//! Outbound message transports.
//!
//! A transport sends one message to one address and classifies the result.
//! The classification is the only thing the dispatcher looks at: transports
//! translate their own error codes into [`OutcomeKind`] so the pruning
//! decision never depends on a particular provider.

pub mod twilio;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use tracing::warn;

pub use twilio::{TwilioGateway, TwilioSettings};

/// Classification of a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Accepted by the transport
    Delivered,
    /// The address can never be delivered to
    RejectedPermanent,
    /// Rejected, but the address may work later
    RejectedTransient,
    /// Network failure, timeout, or anything unclassified
    TransportError,
}

impl OutcomeKind {
    pub fn is_failure(self) -> bool {
        self != OutcomeKind::Delivered
    }
}

/// Result of a send attempt as reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub kind: OutcomeKind,
    /// Diagnostic text from the transport, if any
    pub detail: Option<String>,
}

impl SendOutcome {
    pub fn delivered() -> Self {
        Self {
            kind: OutcomeKind::Delivered,
            detail: None,
        }
    }

    pub fn permanent(detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::RejectedPermanent,
            detail: Some(detail.into()),
        }
    }

    pub fn transient(detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::RejectedTransient,
            detail: Some(detail.into()),
        }
    }

    pub fn transport_error(detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::TransportError,
            detail: Some(detail.into()),
        }
    }
}

/// A sender of single messages to single addresses.
///
/// Implementations must not panic or return early on failure: every call
/// yields an outcome.
#[async_trait]
pub trait TransportGateway: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> SendOutcome;
}

/// Transport used when no provider credentials are configured.
///
/// Lets the service start (registration and listing keep working) while
/// every send is reported as a transport error.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGateway;

#[async_trait]
impl TransportGateway for DisabledGateway {
    async fn send(&self, _to: &str, _body: &str) -> SendOutcome {
        warn!("transport_not_configured");
        SendOutcome::transport_error("transport not configured")
    }
}
