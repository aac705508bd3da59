//! Recipient registry.
//!
//! The registry is the only shared mutable state in the service. The
//! dispatcher reads from it to find matches and deletes from it when the
//! transport reports an address as permanently undeliverable.
//!
//! ## Contract
//!
//! - `find` returns matches in unspecified order unless `NewestFirst` is asked for
//! - `delete_by_address` is idempotent
//! - `insert` enforces address uniqueness with [`RegistryError::DuplicateAddress`]

pub mod memory;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryRegistry;
pub use types::{Recipient, RecipientQuery, SortOrder};

/// Failures raised by a registry engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("address already registered: {0}")]
    DuplicateAddress(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Storage contract consumed by registration, listing and dispatch.
#[async_trait]
pub trait RecipientRegistry: Send + Sync {
    async fn insert(&self, recipient: Recipient) -> Result<(), RegistryError>;

    async fn find(
        &self,
        query: &RecipientQuery,
        order: SortOrder,
    ) -> Result<Vec<Recipient>, RegistryError>;

    /// Remove the recipient with this address. Returns whether one existed.
    async fn delete_by_address(&self, address: &str) -> Result<bool, RegistryError>;

    async fn exists_by_address(&self, address: &str) -> Result<bool, RegistryError>;

    /// Number of stored recipients. Doubles as the health probe.
    async fn count(&self) -> Result<usize, RegistryError>;
}
