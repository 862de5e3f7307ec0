use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use room_gateway::api;
use room_gateway::auth::AccessTokenIssuer;
use room_gateway::config::Config;
use room_gateway::room_service::LiveKitRoomClient;
use room_gateway::state::AppState;
use room_gateway::worker::WorkerDispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before logging so RUST_LOG and LOG_FORMAT can come from .env
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    if let Err(e) = &dotenv {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    tracing::info!("Starting room gateway...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        host = %config.server_host,
        port = %config.server_port,
        room_service = %config.room_service_url(),
        "Configuration loaded"
    );

    let tokens = AccessTokenIssuer::new(&config);
    let rooms = LiveKitRoomClient::new(&config);

    let (worker, worker_task) = start_worker(&config, &tokens);

    let state = AppState::new(config.clone(), tokens, Arc::new(rooms), worker);

    // Build router
    let app = Router::new()
        .merge(api::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last queue sender) is gone; queued joins
    // finish, then live worker sessions leave their rooms.
    if let Some(task) = worker_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Worker dispatcher task failed");
        }
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

#[cfg(feature = "livekit-worker")]
fn start_worker(
    config: &Config,
    tokens: &AccessTokenIssuer,
) -> (WorkerDispatcher, Option<tokio::task::JoinHandle<()>>) {
    use room_gateway::worker::{livekit::LiveKitConnector, LoggingObserver, WorkerSettings};

    let (dispatcher, handle) = WorkerDispatcher::start(
        WorkerSettings::from_config(config),
        tokens.clone(),
        Arc::new(LiveKitConnector),
        Arc::new(LoggingObserver),
    );
    (dispatcher, Some(handle))
}

#[cfg(not(feature = "livekit-worker"))]
fn start_worker(
    _config: &Config,
    _tokens: &AccessTokenIssuer,
) -> (WorkerDispatcher, Option<tokio::task::JoinHandle<()>>) {
    tracing::warn!("Built without the livekit-worker feature, worker joins are disabled");
    (WorkerDispatcher::disabled(), None)
}

/// Handle shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
