//! Session API - the host reports players joining and leaving

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use super::{AppState, ErrorResponse};

/// Build the sessions router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(join))
        .route("/sessions/{player_id}", delete(leave))
}

/// Join request
#[derive(Debug, Deserialize)]
struct JoinRequest {
    id: String,
    name: String,
}

/// GET /sessions
async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.homes.sessions().online())
}

/// POST /sessions
async fn join(State(state): State<AppState>, Json(req): Json<JoinRequest>) -> impl IntoResponse {
    if req.id.is_empty() || req.name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "id and name are required".to_string(),
            }),
        )
            .into_response();
    }

    state.homes.sessions().join(&req.id, &req.name);
    StatusCode::NO_CONTENT.into_response()
}

/// DELETE /sessions/{player_id}
async fn leave(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> impl IntoResponse {
    if state.homes.sessions().leave(&player_id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("player {} is not online", player_id),
            }),
        )
            .into_response()
    }
}
