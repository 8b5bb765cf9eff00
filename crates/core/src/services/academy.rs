//! Academy service.

use arena_common::AppResult;
use arena_db::entities::academy;
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{current, fetch, first_id, list_rows, paginate_rows, remove};
use crate::validation::{check_unique, double_option};

const NOT_FOUND: &str = "academy_not_found";

/// Query filter for academies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AcademyFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub is_active: Option<bool>,
}

impl Filter for AcademyFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["title", "address"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.eq("is_active", self.is_active)
    }
}

/// Input for creating an academy.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAcademyInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub address: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Input for updating an academy.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAcademyInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, max = 512))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl Patch<academy::Entity> for UpdateAcademyInput {
    fn apply_to(self, active: &mut academy::ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(description) = self.description {
            active.description = Set(description);
        }
        if let Some(address) = self.address {
            active.address = Set(address);
        }
        if let Some(phone) = self.phone {
            active.phone = Set(phone);
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
    }
}

/// Academy as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct AcademyResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<academy::Model> for AcademyResponse {
    fn from(model: academy::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            address: model.address,
            phone: model.phone,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<Hydrated<academy::Entity>> for AcademyResponse {
    fn from(row: Hydrated<academy::Entity>) -> Self {
        row.model.into()
    }
}

/// Service for managing academies.
#[derive(Clone)]
pub struct AcademyService {
    repo: Repository<academy::Entity>,
}

impl AcademyService {
    /// Create a new academy service.
    #[must_use]
    pub const fn new(repo: Repository<academy::Entity>) -> Self {
        Self { repo }
    }

    /// List academies matching the filter.
    pub async fn list(&self, filter: &AcademyFilter) -> AppResult<Vec<AcademyResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of academies matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<AcademyFilter>,
    ) -> AppResult<Page<AcademyResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get an academy by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<AcademyResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create an academy with a unique title.
    pub async fn create(&self, input: CreateAcademyInput) -> AppResult<AcademyResponse> {
        input.validate()?;
        self.check_title(&input.title, None).await?;

        let model = self
            .repo
            .create(academy::ActiveModel {
                title: Set(input.title),
                description: Set(input.description),
                address: Set(input.address),
                phone: Set(input.phone),
                is_active: Set(input.is_active),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update an academy.
    pub async fn update(&self, id: i32, input: UpdateAcademyInput) -> AppResult<AcademyResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(title) = &input.title {
            self.check_title(title, Some(id)).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete an academy.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_title(&self, title: &str, current_id: Option<i32>) -> AppResult<()> {
        let filters = PredicateSet::new().eq("title", Some(title)).into_vec();
        let conflict = first_id(&self.repo, &filters).await?;
        check_unique(conflict, current_id, "academy_title_exists")
    }
}
