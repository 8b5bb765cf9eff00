//! Modification type endpoints.

use arena_common::AppResult;
use arena_core::{CreateModificationTypeInput, ModificationTypeFilter, ModificationTypeResponse, UpdateModificationTypeInput};
use arena_db::{Page, PaginationFilter};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of modification types.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<ModificationTypeFilter>,
) -> AppResult<Json<Page<ModificationTypeResponse>>> {
    let page = state
        .modification_type_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every modification type matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<ModificationTypeFilter>,
) -> AppResult<ApiResponse<Vec<ModificationTypeResponse>>> {
    let items = state.modification_type_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a modification type.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<ModificationTypeResponse>> {
    let item = state.modification_type_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Look a modification type up by its value.
async fn show_by_value(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> AppResult<ApiResponse<ModificationTypeResponse>> {
    let item = state.modification_type_service.get_by_value(&value).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a modification type.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateModificationTypeInput>,
) -> AppResult<ApiResponse<ModificationTypeResponse>> {
    let item = state.modification_type_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a modification type.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateModificationTypeInput>,
) -> AppResult<ApiResponse<ModificationTypeResponse>> {
    let item = state.modification_type_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a modification type.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.modification_type_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/by-value/{value}", get(show_by_value))
        .route("/{id}", get(show).put(update).delete(delete))
}
