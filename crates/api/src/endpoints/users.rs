//! User endpoints.

use arena_common::AppResult;
use arena_core::{CreateUserInput, UserFilter, UserResponse, UpdateUserInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of users.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<UserFilter>,
) -> AppResult<Json<Page<UserResponse>>> {
    let page = state
        .user_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every user matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<UserFilter>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let items = state.user_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a user.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<UserResponse>> {
    let item = state.user_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a user.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let item = state.user_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a user.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let item = state.user_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a user.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.user_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
