//! HTTP API surface.
//!
//! Routes, shared state, and the uniform response headers every endpoint
//! carries (`Connection: close`, `Server`, `Content-Type`).
//!
//! ## Structure
//!
//! - [`handlers`] - Endpoint handlers and their wire DTOs.
//! - [`error`] - The [`ApiError`](error::ApiError) response mapping.

pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::{get, head, post};
use stampede_core::TrafficRegistry;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::config::ServerConfig;

/// The `Server` response header value identifying this build.
pub const SERVER_IDENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// State shared by all handlers: the job registry, the health flag, and the
/// validated configuration.
///
/// The registry is constructed here rather than as a global so tests get a
/// fresh one per router.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TrafficRegistry>,
    pub healthy: Arc<AtomicBool>,
    pub config: ServerConfig,
}

impl AppState {
    /// Fresh state with an empty registry. The service reports unhealthy
    /// until the listener is up.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(TrafficRegistry::new()),
            healthy: Arc::new(AtomicBool::new(false)),
            config,
        }
    }
}

/// Builds the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/traffic", post(handlers::create_traffic))
        .route("/api/traffic/{id}", get(handlers::lookup_traffic))
        .route("/healthcheck", head(handlers::healthcheck))
        .route("/healthcheck/{action}", post(handlers::healthcheck_action))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONNECTION,
            HeaderValue::from_static("close"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_IDENT),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
