//! Modification type service.

use arena_common::{AppError, AppResult};
use arena_db::entities::{category_modification, modification_type};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{check_unreferenced, current, fetch, first_id, list_rows, paginate_rows, remove};
use crate::validation::{check_unique, double_option};

const NOT_FOUND: &str = "modification_type_not_found";

/// Query filter for modification types.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModificationTypeFilter {
    #[serde(skip)]
    pub base: BaseFilter,
}

impl Filter for ModificationTypeFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["title_ru", "title_en", "value"]
    }
}

/// Input for creating a modification type.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModificationTypeInput {
    #[validate(length(min = 1, max = 255))]
    pub title_ru: String,
    #[validate(length(max = 255))]
    pub title_en: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub value: String,
}

/// Input for updating a modification type.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateModificationTypeInput {
    #[validate(length(min = 1, max = 255))]
    pub title_ru: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title_en: Option<Option<String>>,
    #[validate(length(min = 1, max = 64))]
    pub value: Option<String>,
}

impl Patch<modification_type::Entity> for UpdateModificationTypeInput {
    fn apply_to(self, active: &mut modification_type::ActiveModel) {
        if let Some(title_ru) = self.title_ru {
            active.title_ru = Set(title_ru);
        }
        if let Some(title_en) = self.title_en {
            active.title_en = Set(title_en);
        }
        if let Some(value) = self.value {
            active.value = Set(value);
        }
    }
}

/// Modification type as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ModificationTypeResponse {
    pub id: i32,
    pub title_ru: String,
    pub title_en: Option<String>,
    pub value: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<modification_type::Model> for ModificationTypeResponse {
    fn from(model: modification_type::Model) -> Self {
        Self {
            id: model.id,
            title_ru: model.title_ru,
            title_en: model.title_en,
            value: model.value,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<Hydrated<modification_type::Entity>> for ModificationTypeResponse {
    fn from(row: Hydrated<modification_type::Entity>) -> Self {
        row.model.into()
    }
}

/// Service for managing modification types.
#[derive(Clone)]
pub struct ModificationTypeService {
    repo: Repository<modification_type::Entity>,
    binding_repo: Repository<category_modification::Entity>,
}

impl ModificationTypeService {
    /// Create a new modification type service.
    #[must_use]
    pub const fn new(
        repo: Repository<modification_type::Entity>,
        binding_repo: Repository<category_modification::Entity>,
    ) -> Self {
        Self { repo, binding_repo }
    }

    /// List modification types matching the filter.
    pub async fn list(
        &self,
        filter: &ModificationTypeFilter,
    ) -> AppResult<Vec<ModificationTypeResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of modification types matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<ModificationTypeFilter>,
    ) -> AppResult<Page<ModificationTypeResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a modification type by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<ModificationTypeResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Get a non-deleted modification type by its value.
    pub async fn get_by_value(&self, value: &str) -> AppResult<ModificationTypeResponse> {
        let filters = PredicateSet::new().eq("value", Some(value)).into_vec();
        self.repo
            .get_first_with_filters(&filters, &[])
            .await?
            .map(ModificationTypeResponse::from)
            .ok_or_else(|| AppError::not_found(NOT_FOUND))
    }

    /// Create a modification type with a unique value.
    pub async fn create(
        &self,
        input: CreateModificationTypeInput,
    ) -> AppResult<ModificationTypeResponse> {
        input.validate()?;
        self.check_value(&input.value, None).await?;

        let model = self
            .repo
            .create(modification_type::ActiveModel {
                title_ru: Set(input.title_ru),
                title_en: Set(input.title_en),
                value: Set(input.value),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a modification type.
    pub async fn update(
        &self,
        id: i32,
        input: UpdateModificationTypeInput,
    ) -> AppResult<ModificationTypeResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(value) = &input.value {
            self.check_value(value, Some(id)).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a modification type.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        if force_delete {
            check_unreferenced(
                &self.binding_repo,
                "modification_type_id",
                id,
                "modification_type_in_use",
            )
            .await?;
        }
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_value(&self, value: &str, current_id: Option<i32>) -> AppResult<()> {
        let filters = PredicateSet::new().eq("value", Some(value)).into_vec();
        let conflict = first_id(&self.repo, &filters).await?;
        check_unique(conflict, current_id, "modification_type_value_exists")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service_for(db: Arc<DatabaseConnection>) -> ModificationTypeService {
        ModificationTypeService::new(Repository::new(Arc::clone(&db)), Repository::new(db))
    }

    fn create_test_type(id: i32, value: &str) -> modification_type::Model {
        let now = chrono::Utc::now().into();
        modification_type::Model {
            id,
            title_ru: "Размер".to_string(),
            title_en: Some("Size".to_string()),
            value: value.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_value() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_type(2, "size")]])
                .into_connection(),
        );
        let service = service_for(db);

        let found = service.get_by_value("size").await.unwrap();
        assert_eq!(found.id, 2);
        assert_eq!(found.value, "size");
    }

    #[tokio::test]
    async fn test_get_by_unknown_value() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<modification_type::Model>::new()])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service.get_by_value("color").await;
        assert_eq!(result.unwrap_err().message_key(), NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_rejects_value_of_other_type() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_type(1, "size")]])
                .append_query_results([[create_test_type(2, "color")]])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service
            .update(
                1,
                UpdateModificationTypeInput {
                    value: Some("color".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(
            result.unwrap_err().message_key(),
            "modification_type_value_exists"
        );
    }
}
