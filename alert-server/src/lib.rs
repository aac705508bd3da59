//! DonorAlert - area and blood-group targeted SMS alerts.
//!
//! Hospitals broadcast an urgent request; every registered donor matching the
//! area and blood group receives an SMS. Numbers the SMS provider reports as
//! permanently invalid are pruned from the registry.
//!
//! ## Architecture
//!
//! ```text
//! HTTP intake → Dispatcher → filter → Registry (read)
//!                          → Transport (one send per donor) → DeliveryReport
//!                          → Registry (delete, permanent failures only)
//! ```

pub mod config;
pub mod dispatch;
pub mod filter;
pub mod registry;
pub mod transport;
pub mod validation;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{BroadcastRequest, DeliveryOutcome, DeliveryReport, DispatchError, Dispatcher};
pub use registry::{InMemoryRegistry, Recipient, RecipientQuery, RecipientRegistry, RegistryError};
pub use transport::{DisabledGateway, OutcomeKind, SendOutcome, TransportGateway, TwilioGateway};
pub use web::AppState;
