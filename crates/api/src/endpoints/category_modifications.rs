//! Category modification endpoints.

use arena_common::AppResult;
use arena_core::{CreateCategoryModificationInput, CategoryModificationFilter, CategoryModificationResponse, UpdateCategoryModificationInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of category modifications.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<CategoryModificationFilter>,
) -> AppResult<Json<Page<CategoryModificationResponse>>> {
    let page = state
        .category_modification_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every category modification matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<CategoryModificationFilter>,
) -> AppResult<ApiResponse<Vec<CategoryModificationResponse>>> {
    let items = state.category_modification_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a category modification.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<CategoryModificationResponse>> {
    let item = state.category_modification_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a category modification.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryModificationInput>,
) -> AppResult<ApiResponse<CategoryModificationResponse>> {
    let item = state.category_modification_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a category modification.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateCategoryModificationInput>,
) -> AppResult<ApiResponse<CategoryModificationResponse>> {
    let item = state.category_modification_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a category modification.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.category_modification_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
