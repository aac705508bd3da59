//! In-process registry engine backed by an address-keyed map.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{Recipient, RecipientQuery, RecipientRegistry, RegistryError, SortOrder};

/// Registry held in memory for the lifetime of the process.
///
/// Keying by address makes uniqueness structural and lets concurrent
/// deletions of distinct addresses proceed without extra coordination.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    recipients: RwLock<HashMap<String, Recipient>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry pre-populated with recipients, skipping duplicate addresses.
    pub fn with_recipients(recipients: impl IntoIterator<Item = Recipient>) -> Self {
        let mut map = HashMap::new();
        for recipient in recipients {
            map.entry(recipient.address.clone()).or_insert(recipient);
        }
        Self {
            recipients: RwLock::new(map),
        }
    }
}

#[async_trait]
impl RecipientRegistry for InMemoryRegistry {
    async fn insert(&self, recipient: Recipient) -> Result<(), RegistryError> {
        let mut recipients = self.recipients.write().await;

        if recipients.contains_key(&recipient.address) {
            return Err(RegistryError::DuplicateAddress(recipient.address));
        }

        info!(
            area = %recipient.area,
            category = %recipient.category,
            "registry_recipient_inserted"
        );
        recipients.insert(recipient.address.clone(), recipient);
        Ok(())
    }

    async fn find(
        &self,
        query: &RecipientQuery,
        order: SortOrder,
    ) -> Result<Vec<Recipient>, RegistryError> {
        let recipients = self.recipients.read().await;

        let mut matches: Vec<Recipient> = recipients
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();

        if order == SortOrder::NewestFirst {
            matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        debug!(
            area = ?query.area,
            category = ?query.category,
            matched = matches.len(),
            "registry_find"
        );

        Ok(matches)
    }

    async fn delete_by_address(&self, address: &str) -> Result<bool, RegistryError> {
        let removed = self.recipients.write().await.remove(address).is_some();
        debug!(removed = removed, "registry_delete");
        Ok(removed)
    }

    async fn exists_by_address(&self, address: &str) -> Result<bool, RegistryError> {
        Ok(self.recipients.read().await.contains_key(address))
    }

    async fn count(&self) -> Result<usize, RegistryError> {
        Ok(self.recipients.read().await.len())
    }
}
