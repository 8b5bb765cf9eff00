//! Request extractors.
//!
//! Rejections are turned into [`AppError`]s so malformed input gets the same
//! localised error body as a failed business rule.

use arena_common::AppError;
use arena_db::{BaseFilter, Filter, PageRequest};
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use axum_extra::extract::Query;
use serde::{Deserialize, de::DeserializeOwned};
use validator::Validate;

use crate::middleware::AppState;

/// Query string parameters; repeated keys fill `Vec` fields.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// An entity filter together with the common search/order/visibility fields.
#[derive(Debug, Clone)]
pub struct FilterQuery<F>(pub F);

impl<S, F> FromRequestParts<S> for FilterQuery<F>
where
    S: Send + Sync,
    F: Filter + DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let QueryParams(base) = QueryParams::<BaseFilter>::from_request_parts(parts, state).await?;
        let QueryParams(filter) = QueryParams::<F>::from_request_parts(parts, state).await?;
        Ok(Self(filter.with_base(base)))
    }
}

/// Raw pagination parameters.
#[derive(Debug, Deserialize, Validate)]
pub struct PageParams {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[validate(range(min = 1))]
    pub per_page: u64,
}

const fn default_page() -> u64 {
    1
}

/// Validated page request; `per_page` is capped at the configured maximum.
#[derive(Debug, Clone, Copy)]
pub struct Paging(pub PageRequest);

impl FromRequestParts<AppState> for Paging {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let QueryParams(params) =
            QueryParams::<PageParams>::from_request_parts(parts, state).await?;
        params.validate()?;

        let per_page = params.per_page.min(state.config.pagination.max_per_page);
        Ok(Self(PageRequest::new(params.page, per_page)))
    }
}

/// Numeric `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub i32);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i32>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|e| AppError::Validation(e.body_text()))
    }
}

/// JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|e| AppError::Validation(e.body_text()))
    }
}

/// Query parameters of a delete.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub force_delete: bool,
}
