//! Broadcast dispatch: match, fan out, aggregate, prune.
//!
//! ## Flow
//!
//! ```text
//! BroadcastRequest → resolve filters → registry.find → compose message
//!     → one send task per recipient (bounded concurrency, per-send timeout)
//!     → DeliveryOutcome per recipient → prune permanent failures → DeliveryReport
//! ```
//!
//! Failures before fan-out (validation, empty match, registry read) abort the
//! dispatch before anything is sent. Once fan-out starts it runs on its own
//! task and finishes even if the caller goes away. Failures during fan-out
//! are contained in the recipient's own outcome and never abort the broadcast.

pub mod report;
pub mod request;

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::filter;
use crate::registry::{Recipient, RecipientRegistry, RegistryError, SortOrder};
use crate::transport::{OutcomeKind, SendOutcome, TransportGateway};
use crate::validation::ValidationError;

pub use report::{DeliveryOutcome, DeliveryReport, ReportBuilder};
pub use request::{compose_message, no_match_message, BroadcastRequest};

/// Default bound on a single send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of sends in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Top-level failures of a dispatch. Partial delivery failure is not one.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The filters matched no recipients
    #[error("{0}")]
    NoMatch(String),

    #[error("registry unavailable: {0}")]
    Storage(#[from] RegistryError),

    /// The fan-out task ended without a report
    #[error("dispatch interrupted: {0}")]
    Interrupted(String),
}

/// Coordinates a broadcast from filter resolution to the delivery report.
///
/// The registry and transport are injected; their lifecycle belongs to the
/// process entry point.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn RecipientRegistry>,
    transport: Arc<dyn TransportGateway>,
    send_timeout: Duration,
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn RecipientRegistry>, transport: Arc<dyn TransportGateway>) -> Self {
        Self {
            registry,
            transport,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Set the maximum number of sends in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one broadcast.
    pub async fn dispatch(&self, request: &BroadcastRequest) -> Result<DeliveryReport, DispatchError> {
        request.validate()?;

        let query = filter::resolve(&request.area, &request.category);
        let recipients = self.registry.find(&query, SortOrder::Unspecified).await?;

        info!(
            originator = %request.originator,
            area = %request.area,
            category = %request.category,
            matched = recipients.len(),
            "dispatch_started"
        );

        if recipients.is_empty() {
            warn!(area = %request.area, category = %request.category, "dispatch_no_match");
            return Err(DispatchError::NoMatch(no_match_message(&request.area)));
        }

        let body: Arc<str> = compose_message(request).into();

        // Detached from the caller: once started, a broadcast runs to completion
        // even if the dispatch future is dropped.
        let fan_out = tokio::spawn(self.clone().fan_out(recipients, body));

        fan_out.await.map_err(|e| {
            error!(error = %e, "dispatch_task_failed");
            DispatchError::Interrupted(e.to_string())
        })
    }

    /// Send to every recipient and aggregate the outcomes.
    async fn fan_out(self, recipients: Vec<Recipient>, body: Arc<str>) -> DeliveryReport {
        let total = recipients.len();

        let outcomes: Vec<DeliveryOutcome> = stream::iter(recipients)
            .map(|recipient| self.spawn_delivery(recipient.address, Arc::clone(&body)))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut builder = ReportBuilder::new(total);
        for outcome in &outcomes {
            builder.record(outcome);
        }
        let report = builder.finish();

        info!(
            matched = report.total_matched,
            successful = report.successful,
            failed = report.failed,
            "dispatch_complete"
        );

        report
    }

    /// Run one recipient's delivery on its own task.
    ///
    /// The returned future always resolves to an outcome: a panicking
    /// transport is reported as a transport error for that address alone.
    fn spawn_delivery(
        &self,
        address: String,
        body: Arc<str>,
    ) -> impl std::future::Future<Output = DeliveryOutcome> {
        let registry = Arc::clone(&self.registry);
        let transport = Arc::clone(&self.transport);
        let send_timeout = self.send_timeout;
        let task_address = address.clone();

        let handle = tokio::spawn(async move {
            deliver(registry, transport, send_timeout, task_address, body).await
        });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(to = %address, error = %e, "send_task_failed");
                    DeliveryOutcome::new(
                        address,
                        SendOutcome::transport_error(format!("send task failed: {}", e)),
                    )
                }
            }
        }
    }
}

/// Send to one address, classify, and prune the address if it is permanently invalid.
async fn deliver(
    registry: Arc<dyn RecipientRegistry>,
    transport: Arc<dyn TransportGateway>,
    send_timeout: Duration,
    address: String,
    body: Arc<str>,
) -> DeliveryOutcome {
    let outcome = match tokio::time::timeout(send_timeout, transport.send(&address, &body)).await {
        Ok(outcome) => outcome,
        Err(_) => SendOutcome::transport_error(format!(
            "send timed out after {}ms",
            send_timeout.as_millis()
        )),
    };

    match outcome.kind {
        OutcomeKind::Delivered => {
            info!(to = %address, "send_delivered");
        }
        OutcomeKind::RejectedPermanent => {
            warn!(to = %address, detail = ?outcome.detail, "send_rejected_permanent");
            prune(registry.as_ref(), &address).await;
        }
        OutcomeKind::RejectedTransient | OutcomeKind::TransportError => {
            warn!(
                to = %address,
                kind = ?outcome.kind,
                detail = ?outcome.detail,
                "send_failed"
            );
        }
    }

    DeliveryOutcome::new(address, outcome)
}

/// Remove a permanently undeliverable address. Failure is logged, not raised:
/// the send outcome has already been decided.
async fn prune(registry: &dyn RecipientRegistry, address: &str) {
    match registry.delete_by_address(address).await {
        Ok(removed) => info!(to = %address, removed = removed, "recipient_pruned"),
        Err(e) => error!(to = %address, error = %e, "recipient_prune_failed"),
    }
}
