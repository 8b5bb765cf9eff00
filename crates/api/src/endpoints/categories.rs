//! Category endpoints.

use arena_common::AppResult;
use arena_core::{CreateCategoryInput, CategoryFilter, CategoryResponse, UpdateCategoryInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of categories.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<CategoryFilter>,
) -> AppResult<Json<Page<CategoryResponse>>> {
    let page = state
        .category_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every category matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<CategoryFilter>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let items = state.category_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a category.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let item = state.category_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a category.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let item = state.category_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a category.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let item = state.category_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a category.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.category_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
