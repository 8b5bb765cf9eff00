//! Category modification service.
//!
//! Binds a modification type to a category. A category may also carry one
//! binding without a type; at most one non-deleted row exists per
//! `(category_id, modification_type_id)` pair, the null pair included.

use arena_common::AppResult;
use arena_db::entities::{category, category_modification, modification_type};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use super::{current, fetch, first_id, list_rows, paginate_rows, remove};
use super::{CategoryResponse, ModificationTypeResponse};
use crate::validation::{check_reference, check_unique, double_option};

const NOT_FOUND: &str = "category_modification_not_found";

/// Query filter for category modifications.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryModificationFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub category_ids: Vec<i32>,
    pub modification_type_ids: Vec<i32>,
    pub has_modification_type: Option<bool>,
}

impl Filter for CategoryModificationFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.any_of("category_id", self.category_ids.iter().copied())
            .any_of(
                "modification_type_id",
                self.modification_type_ids.iter().copied(),
            )
            .null(
                "modification_type_id",
                self.has_modification_type.map(|has| !has),
            )
    }
}

/// Input for creating a category modification.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryModificationInput {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(range(min = 1))]
    pub modification_type_id: Option<i32>,
}

/// Input for updating a category modification.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCategoryModificationInput {
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub modification_type_id: Option<Option<i32>>,
}

impl Patch<category_modification::Entity> for UpdateCategoryModificationInput {
    fn apply_to(self, active: &mut category_modification::ActiveModel) {
        if let Some(category_id) = self.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(modification_type_id) = self.modification_type_id {
            active.modification_type_id = Set(modification_type_id);
        }
    }
}

/// Category modification as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryModificationResponse {
    pub id: i32,
    pub category_id: i32,
    pub modification_type_id: Option<i32>,
    pub category: Option<CategoryResponse>,
    pub modification_type: Option<ModificationTypeResponse>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<Hydrated<category_modification::Entity>> for CategoryModificationResponse {
    fn from(row: Hydrated<category_modification::Entity>) -> Self {
        let Hydrated { model, related } = row;
        Self {
            id: model.id,
            category_id: model.category_id,
            modification_type_id: model.modification_type_id,
            category: related.category.map(Into::into),
            modification_type: related.modification_type.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Service for managing category modifications.
#[derive(Clone)]
pub struct CategoryModificationService {
    repo: Repository<category_modification::Entity>,
    category_repo: Repository<category::Entity>,
    modification_type_repo: Repository<modification_type::Entity>,
}

impl CategoryModificationService {
    /// Create a new category modification service.
    #[must_use]
    pub const fn new(
        repo: Repository<category_modification::Entity>,
        category_repo: Repository<category::Entity>,
        modification_type_repo: Repository<modification_type::Entity>,
    ) -> Self {
        Self {
            repo,
            category_repo,
            modification_type_repo,
        }
    }

    /// List category modifications matching the filter.
    pub async fn list(
        &self,
        filter: &CategoryModificationFilter,
    ) -> AppResult<Vec<CategoryModificationResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of category modifications matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<CategoryModificationFilter>,
    ) -> AppResult<Page<CategoryModificationResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a category modification by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<CategoryModificationResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Bind a modification type (or none) to a category.
    pub async fn create(
        &self,
        input: CreateCategoryModificationInput,
    ) -> AppResult<CategoryModificationResponse> {
        input.validate()?;
        self.check_references(input.category_id, input.modification_type_id)
            .await?;
        self.check_pair(input.category_id, input.modification_type_id, None)
            .await?;

        let model = self
            .repo
            .create(category_modification::ActiveModel {
                category_id: Set(input.category_id),
                modification_type_id: Set(input.modification_type_id),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a category modification.
    ///
    /// The pair after the update must not collide with another binding.
    pub async fn update(
        &self,
        id: i32,
        input: UpdateCategoryModificationInput,
    ) -> AppResult<CategoryModificationResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;

        let category_id = input.category_id.unwrap_or(model.category_id);
        let modification_type_id = input
            .modification_type_id
            .unwrap_or(model.modification_type_id);
        self.check_references(category_id, modification_type_id)
            .await?;
        self.check_pair(category_id, modification_type_id, Some(id))
            .await?;

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a category modification.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_references(
        &self,
        category_id: i32,
        modification_type_id: Option<i32>,
    ) -> AppResult<()> {
        check_reference(
            self.category_repo.exists(category_id).await?,
            "category_not_found",
        )?;
        if let Some(modification_type_id) = modification_type_id {
            check_reference(
                self.modification_type_repo
                    .exists(modification_type_id)
                    .await?,
                "modification_type_not_found",
            )?;
        }
        Ok(())
    }

    async fn check_pair(
        &self,
        category_id: i32,
        modification_type_id: Option<i32>,
        current_id: Option<i32>,
    ) -> AppResult<()> {
        let set = PredicateSet::new().eq("category_id", Some(category_id));
        let set = match modification_type_id {
            Some(modification_type_id) => {
                set.eq("modification_type_id", Some(modification_type_id))
            }
            None => set.null("modification_type_id", Some(true)),
        };

        let conflict = first_id(&self.repo, &set.into_vec()).await?;
        if conflict.is_some_and(|id| Some(id) != current_id) {
            debug!(
                category_id = category_id,
                modification_type_id = ?modification_type_id,
                "Category modification already bound"
            );
        }
        check_unique(conflict, current_id, "category_modification_exists")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_db::Predicate;
    use arena_db::test_utils::TestDatabase;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    use crate::services::ModificationTypeService;

    struct Fixture {
        db: Arc<DatabaseConnection>,
        service: CategoryModificationService,
        category_id: i32,
        modification_type_id: i32,
    }

    async fn setup() -> Fixture {
        let db = Arc::new(TestDatabase::sqlite().await.unwrap().into_connection());
        let category_repo = Repository::<category::Entity>::new(Arc::clone(&db));
        let modification_type_repo = Repository::<modification_type::Entity>::new(Arc::clone(&db));

        let category = category_repo
            .create(category::ActiveModel {
                title_ru: Set("Мячи".to_string()),
                title_en: Set(None),
                is_active: Set(true),
                ..Default::default()
            })
            .await
            .unwrap();
        let modification_type = modification_type_repo
            .create(modification_type::ActiveModel {
                title_ru: Set("Размер".to_string()),
                title_en: Set(None),
                value: Set("size".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        Fixture {
            service: CategoryModificationService::new(
                Repository::new(Arc::clone(&db)),
                category_repo,
                modification_type_repo,
            ),
            category_id: category.id,
            modification_type_id: modification_type.id,
            db,
        }
    }

    fn input(category_id: i32, modification_type_id: Option<i32>) -> CreateCategoryModificationInput {
        CreateCategoryModificationInput {
            category_id,
            modification_type_id,
        }
    }

    #[test]
    fn test_filter_predicates_are_deterministic() {
        let filter = CategoryModificationFilter {
            category_ids: vec![3, 1],
            modification_type_ids: vec![],
            has_modification_type: Some(false),
            ..Default::default()
        };

        let expected = vec![
            Predicate::In {
                field: "category_id",
                values: vec![3.into(), 1.into()],
            },
            Predicate::IsNull {
                field: "modification_type_id",
                is_null: true,
            },
        ];
        assert_eq!(filter.apply(), expected);
        assert_eq!(filter.apply(), filter.apply());
    }

    #[tokio::test]
    async fn test_duplicate_typed_pair_is_rejected() {
        let f = setup().await;
        let created = f
            .service
            .create(input(f.category_id, Some(f.modification_type_id)))
            .await
            .unwrap();
        assert_eq!(
            created.modification_type.map(|t| t.value).as_deref(),
            Some("size")
        );

        let duplicate = f
            .service
            .create(input(f.category_id, Some(f.modification_type_id)))
            .await;
        assert_eq!(
            duplicate.unwrap_err().message_key(),
            "category_modification_exists"
        );
    }

    #[tokio::test]
    async fn test_duplicate_null_pair_is_rejected() {
        let f = setup().await;
        f.service.create(input(f.category_id, None)).await.unwrap();

        let duplicate = f.service.create(input(f.category_id, None)).await;
        assert_eq!(
            duplicate.unwrap_err().message_key(),
            "category_modification_exists"
        );

        // A typed binding for the same category is a different pair
        assert!(
            f.service
                .create(input(f.category_id, Some(f.modification_type_id)))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_soft_deleted_pair_can_be_recreated() {
        let f = setup().await;
        let first = f.service.create(input(f.category_id, None)).await.unwrap();
        f.service.delete(first.id, false).await.unwrap();

        let second = f.service.create(input(f.category_id, None)).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_update_into_existing_pair_is_rejected() {
        let f = setup().await;
        f.service.create(input(f.category_id, None)).await.unwrap();
        let typed = f
            .service
            .create(input(f.category_id, Some(f.modification_type_id)))
            .await
            .unwrap();

        let result = f
            .service
            .update(
                typed.id,
                UpdateCategoryModificationInput {
                    modification_type_id: Some(None),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(
            result.unwrap_err().message_key(),
            "category_modification_exists"
        );

        // Re-saving its own pair is not a collision
        assert!(
            f.service
                .update(typed.id, UpdateCategoryModificationInput::default())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_missing_references_are_bad_requests() {
        let f = setup().await;

        let missing_category = f.service.create(input(999, None)).await.unwrap_err();
        assert_eq!(missing_category.message_key(), "category_not_found");
        assert_eq!(missing_category.status_code().as_u16(), 400);

        let missing_type = f
            .service
            .create(input(f.category_id, Some(999)))
            .await
            .unwrap_err();
        assert_eq!(missing_type.message_key(), "modification_type_not_found");
    }

    #[tokio::test]
    async fn test_bound_modification_type_cannot_be_hard_deleted() {
        let f = setup().await;
        let untyped = f.service.create(input(f.category_id, None)).await.unwrap();
        let typed = f
            .service
            .create(input(f.category_id, Some(f.modification_type_id)))
            .await
            .unwrap();
        let types = ModificationTypeService::new(
            Repository::new(Arc::clone(&f.db)),
            Repository::new(Arc::clone(&f.db)),
        );

        let result = types.delete(f.modification_type_id, true).await;
        assert_eq!(result.unwrap_err().message_key(), "modification_type_in_use");

        // Both pairs stay distinct
        let kept = f.service.get_by_id(typed.id).await.unwrap();
        assert_eq!(kept.modification_type_id, Some(f.modification_type_id));
        let kept = f.service.get_by_id(untyped.id).await.unwrap();
        assert_eq!(kept.modification_type_id, None);

        // A soft-deleted binding still holds the reference
        f.service.delete(typed.id, false).await.unwrap();
        let result = types.delete(f.modification_type_id, true).await;
        assert_eq!(result.unwrap_err().message_key(), "modification_type_in_use");

        f.service.delete(typed.id, true).await.unwrap();
        types.delete(f.modification_type_id, true).await.unwrap();
        assert!(types.get_by_id(f.modification_type_id).await.is_err());
    }
}
