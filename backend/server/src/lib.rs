//! Relay between the food alerts finder and the FSA open-data API.
//!
//! # General Infrastructure
//! - Finder (CLI or any browser frontend) talks only to this relay under `/api`
//! - Relay forwards to `https://data.food.gov.uk/food-alerts`, overridable with `FSA_BASE_URL`
//! - No state between requests besides the pooled HTTP client
//!
//!
//!
//! # Routes
//! - `GET /api/alerts?<params>`: alerts search, parameters copied upstream with
//!   `hazardCategory` and `allergen` moved under `problem.`
//! - `GET /api/ref/{type}`: vocabulary lookup such as `allergens`
//! - `GET /api/ref/alert-type`: alert type vocabulary
//! - `GET /api/health`: liveness, never touches upstream
//!
//! Failures are always a 500 with a `{error, message}` body. See [`error::AppError`].
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! RUST_LOG=info cargo run -p alerts
//! ```
//!
//! Pick a port.
//! ```sh
//! PORT=8080 cargo run -p alerts
//! ```
//!
//! Quick check.
//! ```sh
//! curl "http://localhost:3001/api/alerts?_limit=2&_sort=-created"
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod upstream;

use config::Config;
use routes::{alert_types_handler, alerts_handler, health_handler, reference_handler};
use state::State;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let state = State::new(Config::load()?);

    info!("Starting server...");
    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("FSA API proxy running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/alerts", get(alerts_handler))
        .route("/ref/alert-type", get(alert_types_handler))
        .route("/ref/{vocabulary}", get(reference_handler))
        .route("/health", get(health_handler));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
