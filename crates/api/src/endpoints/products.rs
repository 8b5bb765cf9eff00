//! Product endpoints.

use arena_common::AppResult;
use arena_core::{CreateProductInput, ProductFilter, ProductResponse, UpdateProductInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of products.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<ProductFilter>,
) -> AppResult<Json<Page<ProductResponse>>> {
    let page = state
        .product_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every product matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<ProductFilter>,
) -> AppResult<ApiResponse<Vec<ProductResponse>>> {
    let items = state.product_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a product.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<ProductResponse>> {
    let item = state.product_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a product.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let item = state.product_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a product.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let item = state.product_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a product.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.product_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
