//! HiveSync Agent — presence synchronization engine host
//!
//! Entry point that wires the engine together: configuration, logging,
//! the remote API client, the realtime channel, and the engine lifecycle.

use std::str::FromStr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use hivesync_client::{HttpPresenceApi, StaticTokenProvider, TokenProvider};
use hivesync_core::config::AppConfig;
use hivesync_core::error::AppError;
use hivesync_core::types::UserId;
use hivesync_entity::presence::DeviceKind;
use hivesync_realtime::channel::{InProcessChannel, RealtimeChannel, WsChannel};
use hivesync_service::PresenceEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("HIVESYNC_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main agent run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting HiveSync agent v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Identity ─────────────────────────────────────────
    let user_id = std::env::var("HIVESYNC_USER_ID")
        .map_err(|_| AppError::configuration("HIVESYNC_USER_ID is not set"))
        .and_then(|raw| {
            UserId::from_str(&raw)
                .map_err(|e| AppError::configuration(format!("Invalid HIVESYNC_USER_ID: {e}")))
        })?;
    let device = match std::env::var("HIVESYNC_DEVICE").as_deref() {
        Ok("desktop") => DeviceKind::Desktop,
        Ok("mobile") => DeviceKind::Mobile,
        Ok("web") => DeviceKind::Web,
        _ => DeviceKind::Unknown,
    };

    // ── Step 2: Remote API client ────────────────────────────────
    let tokens: Arc<dyn TokenProvider> = match std::env::var("HIVESYNC_TOKEN") {
        Ok(token) => Arc::new(StaticTokenProvider::new(token)),
        Err(_) => {
            tracing::warn!("HIVESYNC_TOKEN not set; remote calls will fail authentication");
            Arc::new(StaticTokenProvider::empty())
        }
    };
    let api = Arc::new(HttpPresenceApi::new(&config.api, tokens)?);
    tracing::info!("Presence API client ready ({})", config.api.base_url);

    // ── Step 3: Realtime channel ─────────────────────────────────
    let channel: Arc<dyn RealtimeChannel> = match &config.realtime.url {
        Some(url) => {
            tracing::info!("Connecting realtime channel to {}...", url);
            Arc::new(WsChannel::connect(url, config.realtime.channel_buffer_size).await?)
        }
        None => {
            tracing::info!("No realtime gateway configured; using in-process channel");
            Arc::new(InProcessChannel::new(config.realtime.channel_buffer_size))
        }
    };

    // ── Step 4: Engine ───────────────────────────────────────────
    let engine = Arc::new(PresenceEngine::new(
        config.presence.clone(),
        user_id,
        device,
        api,
        channel,
    ));
    engine.start();
    tracing::info!("Presence engine started");

    // ── Step 5: Run until shutdown ───────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, cleaning up...");
    engine.cleanup();

    tracing::info!("HiveSync agent shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
