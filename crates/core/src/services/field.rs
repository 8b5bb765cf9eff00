//! Field (pitch) service.

use arena_common::AppResult;
use arena_db::entities::{academy, field};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AcademyResponse;
use super::{current, fetch, first_id, list_rows, paginate_rows, remove};
use crate::validation::{check_reference, check_unique};

const NOT_FOUND: &str = "field_not_found";

/// Query filter for fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub academy_ids: Vec<i32>,
    pub is_covered: Option<bool>,
    pub price_from: Option<i64>,
    pub price_to: Option<i64>,
}

impl Filter for FieldFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["title", "surface"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.any_of("academy_id", self.academy_ids.iter().copied())
            .eq("is_covered", self.is_covered)
            .range("price_per_hour", self.price_from, self.price_to)
    }
}

/// Input for creating a field.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldInput {
    #[validate(range(min = 1))]
    pub academy_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 64))]
    pub surface: String,
    #[validate(range(min = 0))]
    pub price_per_hour: i64,
    #[serde(default)]
    pub is_covered: bool,
}

/// Input for updating a field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFieldInput {
    #[validate(range(min = 1))]
    pub academy_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub surface: Option<String>,
    #[validate(range(min = 0))]
    pub price_per_hour: Option<i64>,
    pub is_covered: Option<bool>,
}

impl Patch<field::Entity> for UpdateFieldInput {
    fn apply_to(self, active: &mut field::ActiveModel) {
        if let Some(academy_id) = self.academy_id {
            active.academy_id = Set(academy_id);
        }
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(surface) = self.surface {
            active.surface = Set(surface);
        }
        if let Some(price_per_hour) = self.price_per_hour {
            active.price_per_hour = Set(price_per_hour);
        }
        if let Some(is_covered) = self.is_covered {
            active.is_covered = Set(is_covered);
        }
    }
}

/// Field as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct FieldResponse {
    pub id: i32,
    pub academy_id: i32,
    pub title: String,
    pub surface: String,
    pub price_per_hour: i64,
    pub is_covered: bool,
    pub academy: Option<AcademyResponse>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<Hydrated<field::Entity>> for FieldResponse {
    fn from(row: Hydrated<field::Entity>) -> Self {
        let Hydrated { model, related } = row;
        Self {
            id: model.id,
            academy_id: model.academy_id,
            title: model.title,
            surface: model.surface,
            price_per_hour: model.price_per_hour,
            is_covered: model.is_covered,
            academy: related.academy.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Service for managing fields.
#[derive(Clone)]
pub struct FieldService {
    repo: Repository<field::Entity>,
    academy_repo: Repository<academy::Entity>,
}

impl FieldService {
    /// Create a new field service.
    #[must_use]
    pub const fn new(
        repo: Repository<field::Entity>,
        academy_repo: Repository<academy::Entity>,
    ) -> Self {
        Self { repo, academy_repo }
    }

    /// List fields matching the filter.
    pub async fn list(&self, filter: &FieldFilter) -> AppResult<Vec<FieldResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of fields matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<FieldFilter>,
    ) -> AppResult<Page<FieldResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a field by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<FieldResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create a field; titles are unique within an academy.
    pub async fn create(&self, input: CreateFieldInput) -> AppResult<FieldResponse> {
        input.validate()?;
        self.check_academy(input.academy_id).await?;
        self.check_title(input.academy_id, &input.title, None)
            .await?;

        let model = self
            .repo
            .create(field::ActiveModel {
                academy_id: Set(input.academy_id),
                title: Set(input.title),
                surface: Set(input.surface),
                price_per_hour: Set(input.price_per_hour),
                is_covered: Set(input.is_covered),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a field.
    pub async fn update(&self, id: i32, input: UpdateFieldInput) -> AppResult<FieldResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(academy_id) = input.academy_id {
            self.check_academy(academy_id).await?;
        }
        if input.academy_id.is_some() || input.title.is_some() {
            let academy_id = input.academy_id.unwrap_or(model.academy_id);
            let title = input.title.as_deref().unwrap_or(&model.title);
            self.check_title(academy_id, title, Some(id)).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a field.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_academy(&self, academy_id: i32) -> AppResult<()> {
        check_reference(
            self.academy_repo.exists(academy_id).await?,
            "academy_not_found",
        )
    }

    async fn check_title(
        &self,
        academy_id: i32,
        title: &str,
        current_id: Option<i32>,
    ) -> AppResult<()> {
        let filters = PredicateSet::new()
            .eq("academy_id", Some(academy_id))
            .eq("title", Some(title))
            .into_vec();
        let conflict = first_id(&self.repo, &filters).await?;
        check_unique(conflict, current_id, "field_title_exists")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_db::test_utils::TestDatabase;
    use std::sync::Arc;

    async fn setup() -> (FieldService, Repository<academy::Entity>) {
        let db = Arc::new(TestDatabase::sqlite().await.unwrap().into_connection());
        let academy_repo = Repository::<academy::Entity>::new(Arc::clone(&db));
        (
            FieldService::new(Repository::new(db), academy_repo.clone()),
            academy_repo,
        )
    }

    async fn create_academy(repo: &Repository<academy::Entity>, title: &str) -> i32 {
        repo.create(academy::ActiveModel {
            title: Set(title.to_string()),
            description: Set(None),
            address: Set("Lenina 1".to_string()),
            phone: Set(None),
            is_active: Set(true),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
    }

    fn input(academy_id: i32, title: &str) -> CreateFieldInput {
        CreateFieldInput {
            academy_id,
            title: title.to_string(),
            surface: "grass".to_string(),
            price_per_hour: 3000,
            is_covered: false,
        }
    }

    #[tokio::test]
    async fn test_title_unique_per_academy() {
        let (service, academies) = setup().await;
        let dynamo = create_academy(&academies, "Dynamo").await;
        let spartak = create_academy(&academies, "Spartak").await;

        let created = service.create(input(dynamo, "Main")).await.unwrap();
        assert_eq!(created.academy.map(|a| a.title).as_deref(), Some("Dynamo"));

        let duplicate = service.create(input(dynamo, "Main")).await;
        assert_eq!(duplicate.unwrap_err().message_key(), "field_title_exists");

        assert!(service.create(input(spartak, "Main")).await.is_ok());
    }

    #[tokio::test]
    async fn test_move_into_academy_with_same_title() {
        let (service, academies) = setup().await;
        let dynamo = create_academy(&academies, "Dynamo").await;
        let spartak = create_academy(&academies, "Spartak").await;
        service.create(input(dynamo, "Main")).await.unwrap();
        let other = service.create(input(spartak, "Main")).await.unwrap();

        let result = service
            .update(
                other.id,
                UpdateFieldInput {
                    academy_id: Some(dynamo),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(result.unwrap_err().message_key(), "field_title_exists");
    }

    #[tokio::test]
    async fn test_filter_by_academy_and_price() {
        let (service, academies) = setup().await;
        let dynamo = create_academy(&academies, "Dynamo").await;
        let spartak = create_academy(&academies, "Spartak").await;
        service.create(input(dynamo, "Main")).await.unwrap();
        let mut cheap = input(dynamo, "Small");
        cheap.price_per_hour = 1000;
        let cheap = service.create(cheap).await.unwrap();
        service.create(input(spartak, "Main")).await.unwrap();

        let found = service
            .list(&FieldFilter {
                academy_ids: vec![dynamo],
                price_to: Some(2000),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.iter().map(|f| f.id).collect::<Vec<_>>(), vec![cheap.id]);
    }
}
