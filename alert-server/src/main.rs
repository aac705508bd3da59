//! DonorAlert server.
//!
//! This binary:
//! - Loads configuration from the environment
//! - Builds the registry and the SMS transport
//! - Serves the registration, alert and administration API
//! - Shuts down gracefully on SIGINT/SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use donoralert::transport::DisabledGateway;
use donoralert::web::router;
use donoralert::{AppState, Config, InMemoryRegistry, TransportGateway, TwilioGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        twilio_configured = config.twilio.is_some(),
        twilio_api_base = %config.twilio_api_base,
        alert_password_configured = config.alert_password.is_some(),
        send_timeout_ms = config.send_timeout_ms,
        dispatch_concurrency = config.dispatch_concurrency,
        categories = config.allowed_categories.len(),
        "config_loaded"
    );

    // Transport is owned here and injected into the dispatcher
    let transport: Arc<dyn TransportGateway> = match &config.twilio {
        Some(settings) => Arc::new(
            TwilioGateway::new(
                settings.clone(),
                &config.twilio_api_base,
                config.send_timeout(),
            )
            .context("Failed to create Twilio gateway")?,
        ),
        None => {
            warn!("twilio_not_configured_alerts_disabled");
            Arc::new(DisabledGateway)
        }
    };

    let registry = Arc::new(InMemoryRegistry::new());
    info!("registry_ready");

    let state = AppState::new(config.clone(), registry, transport);
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("server_shutting_down");
}
