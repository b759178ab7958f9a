//! Sensi API - HTTP service around the sensitivity engine.
//!
//! This crate provides:
//! - `POST /api/v1/calculate` and `POST /api/v1/explain` over raw form input
//! - A flat-file preset store with CRUD routes
//! - Device lookup backed by a local cache and an optional completion provider
//!
//! ## Architecture
//!
//! ```text
//! Client → axum router (CORS → body limit → trace id → timeout)
//!              ├─ form normalize → sensi_engine::calculate / explain
//!              ├─ PresetStore  (presets.json, fs4 lock)
//!              └─ DeviceLookup (devices.json cache → CompletionProvider)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod devices;
pub mod presets;
pub mod provider;
pub mod routes;
pub mod storage;
pub mod trace;

pub use devices::{DeviceCatalog, DeviceLookup, DeviceSpec};
pub use presets::{NewPreset, Preset, PresetStore};
pub use provider::{CompletionProvider, OpenAiProvider};
pub use routes::AppState;
pub use trace::TRACE_ID_HEADER;

use axum::{middleware, Router};
use sensi_common::Config;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Wrap routes with the service middleware stack.
pub fn with_middleware(router: Router, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(trace::trace_requests))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
}

/// Build the API router with all routes and middleware.
pub fn build_router(config: &Config) -> sensi_common::Result<Router> {
    Ok(with_middleware(routes::build_all_routes(config)?, config))
}

/// Start the API server and run until Ctrl-C.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = config.listen_address();
    let router = build_router(config)?;

    tracing::info!("Starting Sensi API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Sensi API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
