//! Field (pitch) endpoints.

use arena_common::AppResult;
use arena_core::{CreateFieldInput, FieldFilter, FieldResponse, UpdateFieldInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of fields.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<FieldFilter>,
) -> AppResult<Json<Page<FieldResponse>>> {
    let page = state
        .field_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every field matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<FieldFilter>,
) -> AppResult<ApiResponse<Vec<FieldResponse>>> {
    let items = state.field_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a field.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<FieldResponse>> {
    let item = state.field_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a field.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateFieldInput>,
) -> AppResult<ApiResponse<FieldResponse>> {
    let item = state.field_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a field.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateFieldInput>,
) -> AppResult<ApiResponse<FieldResponse>> {
    let item = state.field_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a field.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.field_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
