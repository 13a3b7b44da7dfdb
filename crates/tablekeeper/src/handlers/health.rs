//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Poll loop state (503 once the loop has stopped)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::manager::PollState;
use crate::state::AppState;

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Reports the poll loop state.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Response {
    let poll_state = state.poll_state();
    let status = match poll_state {
        PollState::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        PollState::Idle | PollState::Running => StatusCode::OK,
    };

    (status, Json(serde_json::json!({ "poll_state": poll_state }))).into_response()
}
