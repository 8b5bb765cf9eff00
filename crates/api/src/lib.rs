//! HTTP API layer for arena.
//!
//! Every entity is exposed as the same slice of routes under `/api/v1`:
//! a paginated list, an unpaginated list, and get/create/update/delete by id.
//! Error bodies are rendered in the caller's language.
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// Build the application with routes mounted under `/api/v1`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", endpoints::router())
        .fallback(middleware::not_found)
        .layer(from_fn_with_state(state.clone(), middleware::localize_errors))
        .with_state(state)
}
