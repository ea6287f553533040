use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fragments_types::{RpcResponse, ServiceStatus};

use super::AppState;

// GET /api/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let counts = state
        .db
        .count_users()
        .and_then(|users| Ok((users, state.db.count_fragments()?)));

    match counts {
        Ok((total_users, total_fragments)) => (
            StatusCode::OK,
            Json(RpcResponse::ok(ServiceStatus {
                running: true,
                uptime_secs: state.start_time.elapsed().as_secs(),
                total_users,
                total_fragments,
            })),
        ),
        Err(e) => {
            log::error!("Failed to read status counts: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RpcResponse::err(e.to_string())),
            )
        }
    }
}
