//! Health check endpoint.

use arena_common::AppResult;
use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Report whether the database answers.
async fn health(State(state): State<AppState>) -> AppResult<ApiResponse<HealthResponse>> {
    state.db.ping().await?;

    Ok(ApiResponse::ok(HealthResponse { status: "ok" }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}
