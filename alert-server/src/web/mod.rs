//! Web server module.
//!
//! Thin HTTP intake in front of the registry and the dispatcher:
//! - Registers donors
//! - Authenticates and forwards alert broadcasts
//! - Lists and deletes donors for administration

pub mod auth;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use auth::SharedSecret;
pub use handlers::{
    delete_donor, health, list_donors, register_donor, send_alert, AlertResponse, ApiError,
    AppState, DonorListParams, HealthResponse, JsonBody, MessageResponse, RegisterDonorForm,
    SendAlertForm,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/register-donor", post(register_donor))
        .route("/api/send-alert", post(send_alert))
        .route("/api/donors", get(list_donors))
        .route("/api/donor/:phone", delete(delete_donor))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
