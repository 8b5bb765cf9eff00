//! Order endpoints.

use arena_common::AppResult;
use arena_core::{CreateOrderInput, OrderFilter, OrderResponse, UpdateOrderInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of orders.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<OrderFilter>,
) -> AppResult<Json<Page<OrderResponse>>> {
    let page = state
        .order_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every order matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<OrderFilter>,
) -> AppResult<ApiResponse<Vec<OrderResponse>>> {
    let items = state.order_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a order.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<OrderResponse>> {
    let item = state.order_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a order.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateOrderInput>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let item = state.order_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a order.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateOrderInput>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let item = state.order_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a order.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.order_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
