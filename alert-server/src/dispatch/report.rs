//! Per-recipient outcomes and the aggregate delivery report.

use serde::Serialize;

use crate::transport::{OutcomeKind, SendOutcome};

/// Result of one send attempt to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub address: String,
    pub kind: OutcomeKind,
    pub detail: Option<String>,
}

impl DeliveryOutcome {
    pub fn new(address: impl Into<String>, outcome: SendOutcome) -> Self {
        Self {
            address: address.into(),
            kind: outcome.kind,
            detail: outcome.detail,
        }
    }
}

/// Aggregate result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub total_matched: usize,
    pub successful: usize,
    pub failed: usize,
    /// Present only when `failed > 0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_addresses: Option<Vec<String>>,
}

impl DeliveryReport {
    /// Shape a report from accumulated counters.
    pub fn shape(total_matched: usize, successful: usize, failed_addresses: Vec<String>) -> Self {
        let failed = failed_addresses.len();
        Self {
            total_matched,
            successful,
            failed,
            failed_addresses: (failed > 0).then_some(failed_addresses),
        }
    }

    /// One-line summary, e.g. `Alert sent to 3 donor(s). 1 failed.`
    pub fn summary(&self) -> String {
        let mut summary = format!("Alert sent to {} donor(s).", self.successful);
        if self.failed > 0 {
            summary.push_str(&format!(" {} failed.", self.failed));
        }
        summary
    }
}

/// Accumulates outcomes into a report. Exactly one outcome per recipient.
#[derive(Debug)]
pub struct ReportBuilder {
    total_matched: usize,
    successful: usize,
    failed_addresses: Vec<String>,
}

impl ReportBuilder {
    pub fn new(total_matched: usize) -> Self {
        Self {
            total_matched,
            successful: 0,
            failed_addresses: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        if outcome.kind.is_failure() {
            self.failed_addresses.push(outcome.address.clone());
        } else {
            self.successful += 1;
        }
    }

    pub fn finish(self) -> DeliveryReport {
        DeliveryReport::shape(self.total_matched, self.successful, self.failed_addresses)
    }
}
