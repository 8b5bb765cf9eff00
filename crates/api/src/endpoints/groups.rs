//! Training group endpoints.

use arena_common::AppResult;
use arena_core::{CreateGroupInput, GroupFilter, GroupResponse, UpdateGroupInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of groups.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<GroupFilter>,
) -> AppResult<Json<Page<GroupResponse>>> {
    let page = state
        .group_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every group matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<GroupFilter>,
) -> AppResult<ApiResponse<Vec<GroupResponse>>> {
    let items = state.group_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a group.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<GroupResponse>> {
    let item = state.group_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a group.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let item = state.group_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a group.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateGroupInput>,
) -> AppResult<ApiResponse<GroupResponse>> {
    let item = state.group_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a group.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.group_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
