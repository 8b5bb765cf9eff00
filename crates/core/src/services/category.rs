//! Category service.

use arena_common::AppResult;
use arena_db::entities::{category, product};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{check_unreferenced, current, fetch, first_id, list_rows, paginate_rows, remove};
use crate::validation::{check_unique, double_option};

const NOT_FOUND: &str = "category_not_found";

/// Query filter for categories.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub is_active: Option<bool>,
}

impl Filter for CategoryFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["title_ru", "title_en"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.eq("is_active", self.is_active)
    }
}

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub title_ru: String,
    #[validate(length(max = 255))]
    pub title_en: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Input for updating a category.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 255))]
    pub title_ru: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title_en: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl Patch<category::Entity> for UpdateCategoryInput {
    fn apply_to(self, active: &mut category::ActiveModel) {
        if let Some(title_ru) = self.title_ru {
            active.title_ru = Set(title_ru);
        }
        if let Some(title_en) = self.title_en {
            active.title_en = Set(title_en);
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
    }
}

/// Category as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub title_ru: String,
    pub title_en: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            title_ru: model.title_ru,
            title_en: model.title_en,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<Hydrated<category::Entity>> for CategoryResponse {
    fn from(row: Hydrated<category::Entity>) -> Self {
        row.model.into()
    }
}

/// Service for managing categories.
#[derive(Clone)]
pub struct CategoryService {
    repo: Repository<category::Entity>,
    product_repo: Repository<product::Entity>,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(
        repo: Repository<category::Entity>,
        product_repo: Repository<product::Entity>,
    ) -> Self {
        Self { repo, product_repo }
    }

    /// List categories matching the filter.
    pub async fn list(&self, filter: &CategoryFilter) -> AppResult<Vec<CategoryResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of categories matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<CategoryFilter>,
    ) -> AppResult<Page<CategoryResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a category by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<CategoryResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create a category with a unique Russian title.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<CategoryResponse> {
        input.validate()?;
        self.check_title(&input.title_ru, None).await?;

        let model = self
            .repo
            .create(category::ActiveModel {
                title_ru: Set(input.title_ru),
                title_en: Set(input.title_en),
                is_active: Set(input.is_active),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a category.
    pub async fn update(&self, id: i32, input: UpdateCategoryInput) -> AppResult<CategoryResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(title_ru) = &input.title_ru {
            self.check_title(title_ru, Some(id)).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a category.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        if force_delete {
            check_unreferenced(&self.product_repo, "category_id", id, "category_has_products")
                .await?;
        }
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_title(&self, title_ru: &str, current_id: Option<i32>) -> AppResult<()> {
        let filters = PredicateSet::new().eq("title_ru", Some(title_ru)).into_vec();
        let conflict = first_id(&self.repo, &filters).await?;
        check_unique(conflict, current_id, "category_title_exists")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_db::Predicate;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn service_for(db: Arc<DatabaseConnection>) -> CategoryService {
        CategoryService::new(Repository::new(Arc::clone(&db)), Repository::new(db))
    }

    fn create_test_category(id: i32, title_ru: &str) -> category::Model {
        let now = chrono::Utc::now().into();
        category::Model {
            id,
            title_ru: title_ru.to_string(),
            title_en: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_filter_search_and_flag() {
        let filter = CategoryFilter {
            is_active: Some(false),
            ..Default::default()
        }
        .with_base(BaseFilter {
            search: Some("  мяч ".to_string()),
            ..Default::default()
        });

        assert_eq!(
            filter.apply(),
            vec![
                Predicate::Eq {
                    field: "is_active",
                    value: false.into(),
                },
                Predicate::Search {
                    fields: &["title_ru", "title_en"],
                    term: "мяч".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_create_returns_refetched_row() {
        let created = create_test_category(3, "Мячи");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .append_query_results([[created.clone()]])
                .append_query_results([[created]])
                .into_connection(),
        );
        let service = service_for(db);

        let response = service
            .create(CreateCategoryInput {
                title_ru: "Мячи".to_string(),
                title_en: None,
                is_active: true,
            })
            .await
            .unwrap();

        assert_eq!(response.id, 3);
        assert_eq!(response.title_ru, "Мячи");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_category(1, "Мячи")]])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service
            .create(CreateCategoryInput {
                title_ru: "Мячи".to_string(),
                title_en: None,
                is_active: true,
            })
            .await;

        assert_eq!(result.unwrap_err().message_key(), "category_title_exists");
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<category::Model>::new()])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service.update(9, UpdateCategoryInput::default()).await;
        assert_eq!(result.unwrap_err().message_key(), NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hard_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(0)) }]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = service_for(db);

        assert!(service.delete(1, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_hard_delete_refused_while_products_exist() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(2)) }]])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service.delete(1, true).await;
        assert_eq!(result.unwrap_err().message_key(), "category_has_products");
    }
}
