//! Share API - offering and accepting copies of homes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::AppState;

/// Build the shares router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/players/{player_id}/shares", post(share_home))
        .route("/players/{player_id}/shares/accept", post(accept_share))
}

/// Share request - `target` is an online player's name
#[derive(Debug, Deserialize)]
struct ShareRequest {
    home: String,
    target: String,
}

/// Accept request - `from` is the offering player's name
#[derive(Debug, Deserialize)]
struct AcceptRequest {
    from: String,
    home: String,
}

/// POST /players/{player_id}/shares
async fn share_home(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(req): Json<ShareRequest>,
) -> impl IntoResponse {
    match state.homes.share_home(&player_id, &req.home, &req.target) {
        Ok(offer) => (StatusCode::CREATED, Json(offer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /players/{player_id}/shares/accept
async fn accept_share(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(req): Json<AcceptRequest>,
) -> impl IntoResponse {
    match state.homes.accept_share(&player_id, &req.from, &req.home) {
        Ok(home) => Json(home).into_response(),
        Err(e) => e.into_response(),
    }
}
