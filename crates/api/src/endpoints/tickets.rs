//! Ticket endpoints.

use arena_common::{AppError, AppResult};
use arena_core::{CreateTicketInput, ImageUpload, TicketFilter, TicketResponse, UpdateTicketInput};
use arena_db::{Page, PaginationFilter};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use crate::{
    extractors::{DeleteParams, EntityId, FilterQuery, JsonBody, Paging, QueryParams},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// One page of tickets.
async fn paginate(
    State(state): State<AppState>,
    Paging(page): Paging,
    FilterQuery(filter): FilterQuery<TicketFilter>,
) -> AppResult<Json<Page<TicketResponse>>> {
    let page = state
        .ticket_service
        .paginate(&PaginationFilter::new(filter, page))
        .await?;

    Ok(Json(page))
}

/// Every ticket matching the filter.
async fn list(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<TicketFilter>,
) -> AppResult<ApiResponse<Vec<TicketResponse>>> {
    let items = state.ticket_service.list(&filter).await?;

    Ok(ApiResponse::ok(items))
}

/// Get a ticket.
async fn show(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<TicketResponse>> {
    let item = state.ticket_service.get_by_id(id).await?;

    Ok(ApiResponse::ok(item))
}

/// Create a ticket.
async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTicketInput>,
) -> AppResult<ApiResponse<TicketResponse>> {
    let item = state.ticket_service.create(input).await?;

    Ok(ApiResponse::ok(item))
}

/// Update a ticket.
async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(input): JsonBody<UpdateTicketInput>,
) -> AppResult<ApiResponse<TicketResponse>> {
    let item = state.ticket_service.update(id, input).await?;

    Ok(ApiResponse::ok(item))
}

fn multipart_error(e: MultipartError) -> AppError {
    tracing::debug!(error = %e, "Rejected multipart body");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::bad_request("image_too_large")
    } else {
        AppError::Validation(e.body_text())
    }
}

/// Upload the poster image of a ticket from the `image` multipart field.
async fn upload_image(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<TicketResponse>> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?;

        image = Some(ImageUpload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let image = image.ok_or_else(|| AppError::bad_request("image_required"))?;
    let item = state.ticket_service.upload_image(id, image).await?;

    Ok(ApiResponse::ok(item))
}

/// Delete a ticket.
async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    QueryParams(params): QueryParams<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    state.ticket_service.delete(id, params.force_delete).await?;

    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(paginate).post(create))
        .route("/all", get(list))
        .route("/{id}", get(show).put(update).delete(delete))
        .route(
            "/upload-image/{id}",
            put(upload_image).layer(DefaultBodyLimit::disable()),
        )
}
