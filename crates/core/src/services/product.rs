//! Product service.

use arena_common::AppResult;
use arena_db::entities::{category, order, product};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CategoryResponse;
use super::{check_unreferenced, current, fetch, list_rows, paginate_rows, remove};
use crate::validation::{check_reference, double_option};

const NOT_FOUND: &str = "product_not_found";

/// Query filter for products.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub category_ids: Vec<i32>,
    pub is_active: Option<bool>,
    pub price_from: Option<i64>,
    pub price_to: Option<i64>,
}

impl Filter for ProductFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["title", "description"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.any_of("category_id", self.category_ids.iter().copied())
            .eq("is_active", self.is_active)
            .range("price", self.price_from, self.price_to)
    }
}

/// Input for creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Input for updating a product.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductInput {
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

impl Patch<product::Entity> for UpdateProductInput {
    fn apply_to(self, active: &mut product::ActiveModel) {
        if let Some(category_id) = self.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(description) = self.description {
            active.description = Set(description);
        }
        if let Some(price) = self.price {
            active.price = Set(price);
        }
        if let Some(stock) = self.stock {
            active.stock = Set(stock);
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
    }
}

/// Product as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub is_active: bool,
    pub category: Option<CategoryResponse>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl ProductResponse {
    fn with_category(model: product::Model, category: Option<category::Model>) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            price: model.price,
            stock: model.stock,
            is_active: model.is_active,
            category: category.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self::with_category(model, None)
    }
}

impl From<Hydrated<product::Entity>> for ProductResponse {
    fn from(row: Hydrated<product::Entity>) -> Self {
        Self::with_category(row.model, row.related.category)
    }
}

/// Service for managing products.
#[derive(Clone)]
pub struct ProductService {
    repo: Repository<product::Entity>,
    category_repo: Repository<category::Entity>,
    order_repo: Repository<order::Entity>,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub const fn new(
        repo: Repository<product::Entity>,
        category_repo: Repository<category::Entity>,
        order_repo: Repository<order::Entity>,
    ) -> Self {
        Self {
            repo,
            category_repo,
            order_repo,
        }
    }

    /// List products matching the filter.
    pub async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<ProductResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of products matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<ProductFilter>,
    ) -> AppResult<Page<ProductResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a product by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<ProductResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create a product in an existing category.
    pub async fn create(&self, input: CreateProductInput) -> AppResult<ProductResponse> {
        input.validate()?;
        self.check_category(input.category_id).await?;

        let model = self
            .repo
            .create(product::ActiveModel {
                category_id: Set(input.category_id),
                title: Set(input.title),
                description: Set(input.description),
                price: Set(input.price),
                stock: Set(input.stock),
                is_active: Set(input.is_active),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a product.
    pub async fn update(&self, id: i32, input: UpdateProductInput) -> AppResult<ProductResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(category_id) = input.category_id {
            self.check_category(category_id).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a product.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        if force_delete {
            check_unreferenced(&self.order_repo, "product_id", id, "product_has_orders").await?;
        }
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_category(&self, category_id: i32) -> AppResult<()> {
        check_reference(
            self.category_repo.exists(category_id).await?,
            "category_not_found",
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_db::Predicate;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn service_for(db: Arc<DatabaseConnection>) -> ProductService {
        ProductService::new(
            Repository::new(Arc::clone(&db)),
            Repository::new(Arc::clone(&db)),
            Repository::new(db),
        )
    }

    fn create_test_product(id: i32, category_id: i32) -> product::Model {
        let now = chrono::Utc::now().into();
        product::Model {
            id,
            category_id,
            title: "Ball".to_string(),
            description: None,
            price: 1500,
            stock: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn create_test_category(id: i32) -> category::Model {
        let now = chrono::Utc::now().into();
        category::Model {
            id,
            title_ru: "Мячи".to_string(),
            title_en: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn count(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    #[test]
    fn test_price_range_predicate() {
        let filter = ProductFilter {
            price_from: Some(100),
            ..Default::default()
        };
        assert_eq!(
            filter.apply(),
            vec![Predicate::Range {
                field: "price",
                min: Some(100_i64.into()),
                max: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_create_in_missing_category() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count(0)]])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service
            .create(CreateProductInput {
                category_id: 7,
                title: "Ball".to_string(),
                description: None,
                price: 1500,
                stock: 1,
                is_active: true,
            })
            .await;

        assert_eq!(result.unwrap_err().message_key(), "category_not_found");
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_for(db);

        let result = service
            .create(CreateProductInput {
                category_id: 1,
                title: "Ball".to_string(),
                description: None,
                price: -1,
                stock: 1,
                is_active: true,
            })
            .await;

        assert_eq!(result.unwrap_err().message_key(), "validation_error");
    }

    #[tokio::test]
    async fn test_get_by_id_includes_category() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_product(1, 2)]])
                .append_query_results([[create_test_category(2)]])
                .into_connection(),
        );
        let service = service_for(db);

        let product = service.get_by_id(1).await.unwrap();
        assert_eq!(product.category.map(|c| c.id), Some(2));
    }
}
