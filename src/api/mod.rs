//! HTTP API module - home commands as REST endpoints

mod homes;
mod sessions;
mod shares;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::commands::{HomeError, HomeService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub homes: Arc<HomeService>,
}

/// Build the API router
pub fn router(homes: Arc<HomeService>) -> Router {
    let state = AppState { homes };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(homes::router())
        .merge(shares::router())
        .merge(sessions::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for HomeError {
    fn into_response(self) -> Response {
        let status = match &self {
            HomeError::InvalidName(_) | HomeError::SelfTarget => StatusCode::BAD_REQUEST,
            HomeError::CapacityExceeded | HomeError::TargetFull(_) => StatusCode::CONFLICT,
            HomeError::Unauthorized(_) => StatusCode::FORBIDDEN,
            HomeError::NotFound(_)
            | HomeError::PlayerOffline(_)
            | HomeError::NoSuchOffer { .. }
            | HomeError::HomeGone(_) => StatusCode::NOT_FOUND,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "homepointsd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.homes.registry();
    Json(HealthResponse {
        status: "healthy",
        owners: registry.owner_count(),
        public_homes: registry.public_home_count(),
        pending_shares: state.homes.shares().len(),
        online: state.homes.sessions().len(),
        unsaved_changes: registry.is_dirty(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    owners: usize,
    public_homes: usize,
    pending_shares: usize,
    online: usize,
    unsaved_changes: bool,
}
