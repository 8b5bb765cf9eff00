//! Training group service.

use arena_common::AppResult;
use arena_db::entities::{academy, group};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AcademyResponse;
use super::{current, fetch, list_rows, paginate_rows, remove};
use crate::validation::{check_age_range, check_reference, double_option};

const NOT_FOUND: &str = "group_not_found";

/// Query filter for groups.
///
/// `age` selects groups whose age bounds include it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub academy_ids: Vec<i32>,
    pub age: Option<i32>,
}

impl Filter for GroupFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["title", "coach_name"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.any_of("academy_id", self.academy_ids.iter().copied())
            .range("min_age", None, self.age)
            .range("max_age", self.age, None)
    }
}

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(range(min = 1))]
    pub academy_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub coach_name: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub min_age: i32,
    #[validate(range(min = 0, max = 100))]
    pub max_age: i32,
    #[validate(range(min = 1))]
    pub capacity: i32,
}

/// Input for updating a group.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGroupInput {
    #[validate(range(min = 1))]
    pub academy_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub coach_name: Option<Option<String>>,
    #[validate(range(min = 0, max = 100))]
    pub min_age: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub max_age: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
}

impl Patch<group::Entity> for UpdateGroupInput {
    fn apply_to(self, active: &mut group::ActiveModel) {
        if let Some(academy_id) = self.academy_id {
            active.academy_id = Set(academy_id);
        }
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(coach_name) = self.coach_name {
            active.coach_name = Set(coach_name);
        }
        if let Some(min_age) = self.min_age {
            active.min_age = Set(min_age);
        }
        if let Some(max_age) = self.max_age {
            active.max_age = Set(max_age);
        }
        if let Some(capacity) = self.capacity {
            active.capacity = Set(capacity);
        }
    }
}

/// Group as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: i32,
    pub academy_id: i32,
    pub title: String,
    pub coach_name: Option<String>,
    pub min_age: i32,
    pub max_age: i32,
    pub capacity: i32,
    pub academy: Option<AcademyResponse>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl GroupResponse {
    fn with_academy(model: group::Model, academy: Option<academy::Model>) -> Self {
        Self {
            id: model.id,
            academy_id: model.academy_id,
            title: model.title,
            coach_name: model.coach_name,
            min_age: model.min_age,
            max_age: model.max_age,
            capacity: model.capacity,
            academy: academy.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<group::Model> for GroupResponse {
    fn from(model: group::Model) -> Self {
        Self::with_academy(model, None)
    }
}

impl From<Hydrated<group::Entity>> for GroupResponse {
    fn from(row: Hydrated<group::Entity>) -> Self {
        Self::with_academy(row.model, row.related.academy)
    }
}

/// Service for managing groups.
#[derive(Clone)]
pub struct GroupService {
    repo: Repository<group::Entity>,
    academy_repo: Repository<academy::Entity>,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(
        repo: Repository<group::Entity>,
        academy_repo: Repository<academy::Entity>,
    ) -> Self {
        Self { repo, academy_repo }
    }

    /// List groups matching the filter.
    pub async fn list(&self, filter: &GroupFilter) -> AppResult<Vec<GroupResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of groups matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<GroupFilter>,
    ) -> AppResult<Page<GroupResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<GroupResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create a group in an existing academy.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<GroupResponse> {
        input.validate()?;
        check_age_range(input.min_age, input.max_age)?;
        self.check_academy(input.academy_id).await?;

        let model = self
            .repo
            .create(group::ActiveModel {
                academy_id: Set(input.academy_id),
                title: Set(input.title),
                coach_name: Set(input.coach_name),
                min_age: Set(input.min_age),
                max_age: Set(input.max_age),
                capacity: Set(input.capacity),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a group; the merged age bounds must stay ordered.
    pub async fn update(&self, id: i32, input: UpdateGroupInput) -> AppResult<GroupResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        check_age_range(
            input.min_age.unwrap_or(model.min_age),
            input.max_age.unwrap_or(model.max_age),
        )?;
        if let Some(academy_id) = input.academy_id {
            self.check_academy(academy_id).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a group.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_academy(&self, academy_id: i32) -> AppResult<()> {
        check_reference(
            self.academy_repo.exists(academy_id).await?,
            "academy_not_found",
        )
    }
}
