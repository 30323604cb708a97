//! API route handlers for the focus-guard server.

pub mod health;
pub mod students;
pub mod ws;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET  /api/health - Health check
/// - GET  /api/student/{id}/status - Student row plus latest pending intervention
/// - POST /api/daily-checkin - Submit quiz score and focus minutes
/// - POST /api/report-cheat - Report a focus violation
/// - POST /api/assign-intervention - Assign a remedial task
/// - POST /api/complete-intervention - Mark a remedial task complete
/// - GET  /ws - Realtime status channel (WebSocket)
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", students::router())
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}
