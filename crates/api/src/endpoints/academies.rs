//! Academy endpoints.

use arena_common::AppResult;
use arena_core::{CreateAcademyInput, AcademyFilter, AcademyResponse, UpdateAcademyInput};
use arena_db::{Page, PaginationFilter};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of academies.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<AcademyFilter>,
) -> AppResult<Json<Page<AcademyResponse>>> {
    let page = state
        .academy_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every academy matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<AcademyFilter>,
) -> AppResult<ApiResponse<Vec<AcademyResponse>>> {
    let items = state.academy_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a academy.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<AcademyResponse>> {
    let item = state.academy_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a academy.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateAcademyInput>,
) -> AppResult<ApiResponse<AcademyResponse>> {
    let item = state.academy_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a academy.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateAcademyInput>,
) -> AppResult<ApiResponse<AcademyResponse>> {
    let item = state.academy_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a academy.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.academy_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
}
