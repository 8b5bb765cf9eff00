//! Order service.
//!
//! `total_price` is always `product.price * quantity`, computed here and
//! recomputed whenever an update touches the product or the quantity.

use arena_common::{AppError, AppResult};
use arena_db::entities::order::{self, OrderStatus};
use arena_db::entities::{product, user};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveEnum, Set};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use super::{ProductResponse, UserResponse};
use super::{current, fetch, list_rows, paginate_rows, remove};
use crate::validation::{check_reference, double_option, order_total};

const NOT_FOUND: &str = "order_not_found";

/// Query filter for orders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub user_ids: Vec<i32>,
    pub product_ids: Vec<i32>,
    pub statuses: Vec<OrderStatus>,
    pub created_from: Option<DateTimeWithTimeZone>,
    pub created_to: Option<DateTimeWithTimeZone>,
}

impl Filter for OrderFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["comment"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.any_of("user_id", self.user_ids.iter().copied())
            .any_of("product_id", self.product_ids.iter().copied())
            .any_of("status", self.statuses.iter().map(|status| status.to_value()))
            .range("created_at", self.created_from, self.created_to)
    }
}

/// Input for placing an order.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub status: OrderStatus,
    pub comment: Option<String>,
}

/// Input for updating an order.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOrderInput {
    #[validate(range(min = 1))]
    pub user_id: Option<i32>,
    #[validate(range(min = 1))]
    pub product_id: Option<i32>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub comment: Option<Option<String>>,
}

/// An order update together with its recomputed total.
struct OrderPatch {
    input: UpdateOrderInput,
    total_price: Option<i64>,
}

impl Patch<order::Entity> for OrderPatch {
    fn apply_to(self, active: &mut order::ActiveModel) {
        let input = self.input;
        if let Some(user_id) = input.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(product_id) = input.product_id {
            active.product_id = Set(product_id);
        }
        if let Some(quantity) = input.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(comment) = input.comment {
            active.comment = Set(comment);
        }
        if let Some(total_price) = self.total_price {
            active.total_price = Set(total_price);
        }
    }
}

/// Order as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub total_price: i64,
    pub status: OrderStatus,
    pub comment: Option<String>,
    pub user: Option<UserResponse>,
    pub product: Option<ProductResponse>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<Hydrated<order::Entity>> for OrderResponse {
    fn from(row: Hydrated<order::Entity>) -> Self {
        let Hydrated { model, related } = row;
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            quantity: model.quantity,
            total_price: model.total_price,
            status: model.status,
            comment: model.comment,
            user: related.user.map(Into::into),
            product: related.product.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Service for managing orders.
#[derive(Clone)]
pub struct OrderService {
    repo: Repository<order::Entity>,
    user_repo: Repository<user::Entity>,
    product_repo: Repository<product::Entity>,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        repo: Repository<order::Entity>,
        user_repo: Repository<user::Entity>,
        product_repo: Repository<product::Entity>,
    ) -> Self {
        Self {
            repo,
            user_repo,
            product_repo,
        }
    }

    /// List orders matching the filter.
    pub async fn list(&self, filter: &OrderFilter) -> AppResult<Vec<OrderResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of orders matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<OrderFilter>,
    ) -> AppResult<Page<OrderResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get an order by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<OrderResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Place an order for an active product.
    pub async fn create(&self, input: CreateOrderInput) -> AppResult<OrderResponse> {
        input.validate()?;
        self.check_user(input.user_id).await?;
        let product = self.orderable_product(input.product_id).await?;
        let total_price = order_total(product.price, input.quantity)?;

        let model = self
            .repo
            .create(order::ActiveModel {
                user_id: Set(input.user_id),
                product_id: Set(input.product_id),
                quantity: Set(input.quantity),
                total_price: Set(total_price),
                status: Set(input.status),
                comment: Set(input.comment),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update an order.
    pub async fn update(&self, id: i32, input: UpdateOrderInput) -> AppResult<OrderResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(user_id) = input.user_id {
            self.check_user(user_id).await?;
        }

        let total_price = if input.product_id.is_some() || input.quantity.is_some() {
            let product = match input.product_id {
                Some(product_id) if product_id != model.product_id => {
                    self.orderable_product(product_id).await?
                }
                _ => self
                    .product_repo
                    .get(model.product_id, &[], false)
                    .await?
                    .map(|row| row.model)
                    .ok_or_else(|| AppError::bad_request("product_not_found"))?,
            };
            let quantity = input.quantity.unwrap_or(model.quantity);
            Some(order_total(product.price, quantity)?)
        } else {
            None
        };

        self.repo
            .update(model, OrderPatch { input, total_price })
            .await?;
        self.get_by_id(id).await
    }

    /// Delete an order.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_user(&self, user_id: i32) -> AppResult<()> {
        check_reference(self.user_repo.exists(user_id).await?, "user_not_found")
    }

    async fn orderable_product(&self, product_id: i32) -> AppResult<product::Model> {
        let product = self
            .product_repo
            .get(product_id, &[], false)
            .await?
            .ok_or_else(|| AppError::bad_request("product_not_found"))?
            .model;

        if !product.is_active {
            debug!(product_id = product_id, "Product is not orderable");
            return Err(AppError::bad_request("product_inactive"));
        }
        Ok(product)
    }
}
