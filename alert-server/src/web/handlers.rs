//! HTTP endpoint handlers.
//!
//! Handlers do intake only: authenticate, validate, then hand off to the
//! registry or the dispatcher. Every error body is `{"message": ...}`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::dispatch::{BroadcastRequest, DispatchError, Dispatcher};
use crate::filter::resolve_optional;
use crate::registry::{Recipient, RecipientRegistry, RegistryError, SortOrder};
use crate::transport::TransportGateway;
use crate::validation::{validate_registration, ValidationError};
use crate::web::auth::SharedSecret;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<dyn RecipientRegistry>,
    pub dispatcher: Dispatcher,
    pub secret: Arc<SharedSecret>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<dyn RecipientRegistry>,
        transport: Arc<dyn TransportGateway>,
    ) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&registry), transport)
            .with_send_timeout(config.send_timeout())
            .with_concurrency(config.dispatch_concurrency);
        let secret = SharedSecret::new(config.alert_password.as_deref());

        Self {
            config: Arc::new(config),
            registry,
            dispatcher,
            secret: Arc::new(secret),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Generic JSON response carrying a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid password. You are not authorized to send alerts.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::DuplicateAddress(_) => {
                ApiError::BadRequest("Phone number already registered".to_string())
            }
            RegistryError::Storage(_) => {
                error!(error = %e, "registry_error");
                ApiError::Internal
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Validation(e) => e.into(),
            DispatchError::NoMatch(message) => ApiError::NotFound(message),
            DispatchError::Storage(e) => e.into(),
            DispatchError::Interrupted(_) => {
                error!(error = %e, "dispatch_interrupted");
                ApiError::Internal
            }
        }
    }
}

/// JSON request body. Unreadable bodies are rejected as [`ApiError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<usize>,
}

/// Health check endpoint. Probes the registry.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let recipients = match state.registry.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "health_registry_unavailable");
            None
        }
    };

    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        database: if recipients.is_some() { "Connected" } else { "Disconnected" },
        recipients,
    })
}

// =============================================================================
// Registration
// =============================================================================

/// Registration payload. Every field is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDonorForm {
    pub name: Option<String>,
    pub area: Option<String>,
    pub phone: Option<String>,
    pub blood_group: Option<String>,
}

/// Register a donor.
pub async fn register_donor(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<RegisterDonorForm>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let recipient = validate_registration(
        form.name.as_deref(),
        form.area.as_deref(),
        form.phone.as_deref(),
        form.blood_group.as_deref(),
        &state.config.allowed_categories,
    )
    .map_err(|e| {
        warn!(error = %e, "register_validation_failed");
        ApiError::from(e)
    })?;

    if state.registry.exists_by_address(&recipient.address).await? {
        warn!(area = %recipient.area, "register_duplicate_address");
        return Err(RegistryError::DuplicateAddress(recipient.address).into());
    }

    let area = recipient.area.clone();
    let category = recipient.category.clone();
    state.registry.insert(recipient).await?;

    info!(area = %area, category = %category, "donor_registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Donor registered successfully")),
    ))
}

// =============================================================================
// Broadcast
// =============================================================================

/// Alert payload from a hospital.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAlertForm {
    pub hospital_name: Option<String>,
    pub area: Option<String>,
    pub blood_group: Option<String>,
    pub additional_info: Option<String>,
    pub password: Option<String>,
}

/// Alert response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub message: String,
    pub total_matched: usize,
    pub successful_sends: usize,
    pub failed_sends: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_numbers: Option<Vec<String>>,
}

/// Broadcast an alert to matching donors.
///
/// The password is checked before anything else; an unauthorized request
/// never reaches the dispatcher. An unreadable body carries no password.
pub async fn send_alert(
    State(state): State<AppState>,
    body: Result<JsonBody<SendAlertForm>, ApiError>,
) -> Result<Json<AlertResponse>, ApiError> {
    let form = match body {
        Ok(JsonBody(form)) => form,
        Err(e) => {
            warn!(error = %e, "send_alert_unreadable_body");
            SendAlertForm::default()
        }
    };

    if !state.secret.verify(form.password.as_deref().unwrap_or_default()) {
        warn!(
            has_password = form.password.is_some(),
            password_configured = state.secret.is_configured(),
            "send_alert_unauthorized"
        );
        return Err(ApiError::Unauthorized);
    }

    let request = BroadcastRequest::new(
        form.hospital_name.as_deref(),
        form.area.as_deref(),
        form.blood_group.as_deref(),
        form.additional_info.as_deref(),
    )?;

    info!(
        originator = %request.originator,
        area = %request.area,
        category = %request.category,
        "send_alert_received"
    );

    let report = state.dispatcher.dispatch(&request).await?;

    Ok(Json(AlertResponse {
        message: report.summary(),
        total_matched: report.total_matched,
        successful_sends: report.successful,
        failed_sends: report.failed,
        failed_numbers: report.failed_addresses,
    }))
}

// =============================================================================
// Listing & Administration
// =============================================================================

/// Optional listing filters. Missing, blank, `All` and `Any` mean unconstrained.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorListParams {
    pub area: Option<String>,
    pub blood_group: Option<String>,
}

/// List donors, newest first.
pub async fn list_donors(
    State(state): State<AppState>,
    Query(params): Query<DonorListParams>,
) -> Result<Json<Vec<Recipient>>, ApiError> {
    let query = resolve_optional(params.area.as_deref(), params.blood_group.as_deref());
    let donors = state.registry.find(&query, SortOrder::NewestFirst).await?;

    info!(
        area = ?query.area,
        category = ?query.category,
        count = donors.len(),
        "donors_listed"
    );

    Ok(Json(donors))
}

/// Delete a donor by phone number. Deleting an unknown number succeeds.
pub async fn delete_donor(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.registry.delete_by_address(&phone).await?;

    info!(removed = removed, "donor_deleted");

    Ok(Json(MessageResponse::new("Donor deleted successfully")))
}
