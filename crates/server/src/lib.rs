// crates/server/src/lib.rs
//! Focus-guard server library.
//!
//! This crate provides the Axum-based HTTP server that records student
//! check-ins and focus violations, manages remedial interventions, notifies
//! mentors through a webhook and pushes status changes over a WebSocket.

pub mod config;
pub mod error;
pub mod notifier;
pub mod realtime;
pub mod routes;
pub mod service;
pub mod state;

pub use config::ServerConfig;
pub use error::*;
pub use notifier::{MentorAlert, Notifier, NotifyError, NotifyOutcome, WebhookNotifier};
pub use realtime::Broadcaster;
pub use routes::api_routes;
pub use service::StatusService;
pub use state::AppState;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// An empty `cors_origins` allows any origin.
pub fn create_app(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(api_routes(state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

// ============================================================================
// Integration Tests
// ============================================================================
