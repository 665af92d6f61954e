//! Home API - private and public homes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use super::AppState;
use crate::commands::{Location, SetOutcome};

/// Build the homes router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/players/{player_id}/homes", get(list_homes))
        .route(
            "/players/{player_id}/homes/{name}",
            get(get_home).put(set_home).delete(delete_home),
        )
        .route("/public", get(list_public_homes))
        .route("/public/{name}", get(get_public_home))
        .route(
            "/players/{player_id}/public/{name}",
            put(set_public_home).delete(delete_public_home),
        )
}

/// Response for set operations
#[derive(Debug, Serialize)]
struct SetHomeResponse {
    name: String,
    outcome: SetOutcome,
}

fn set_response(name: String, outcome: SetOutcome) -> axum::response::Response {
    let status = match outcome {
        SetOutcome::Created => StatusCode::CREATED,
        SetOutcome::Updated => StatusCode::OK,
    };
    (status, Json(SetHomeResponse { name, outcome })).into_response()
}

/// GET /players/{player_id}/homes
async fn list_homes(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> impl IntoResponse {
    Json(state.homes.homes(&player_id))
}

/// GET /players/{player_id}/homes/{name}
/// Resolves a teleport target
async fn get_home(
    State(state): State<AppState>,
    Path((player_id, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.homes.home(&player_id, &name) {
        Ok(home) => Json(home).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /players/{player_id}/homes/{name}
async fn set_home(
    State(state): State<AppState>,
    Path((player_id, name)): Path<(String, String)>,
    Json(location): Json<Location>,
) -> impl IntoResponse {
    match state.homes.set_home(&player_id, &name, location) {
        Ok(outcome) => set_response(name, outcome),
        Err(e) => e.into_response(),
    }
}

/// DELETE /players/{player_id}/homes/{name}
async fn delete_home(
    State(state): State<AppState>,
    Path((player_id, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.homes.delete_home(&player_id, &name) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /public
async fn list_public_homes(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.homes.public_homes())
}

/// GET /public/{name}
async fn get_public_home(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.homes.public_home(&name) {
        Ok(home) => Json(home).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /players/{player_id}/public/{name}
async fn set_public_home(
    State(state): State<AppState>,
    Path((player_id, name)): Path<(String, String)>,
    Json(location): Json<Location>,
) -> impl IntoResponse {
    match state.homes.set_public_home(&player_id, &name, location) {
        Ok(outcome) => set_response(name, outcome),
        Err(e) => e.into_response(),
    }
}

/// DELETE /players/{player_id}/public/{name}
async fn delete_public_home(
    State(state): State<AppState>,
    Path((player_id, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.homes.delete_public_home(&player_id, &name) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
