//! User service.

use arena_common::AppResult;
use arena_db::entities::{order, request_to_group, user};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{check_unreferenced, current, fetch, first_id, list_rows, paginate_rows, remove};
use crate::validation::{check_unique, double_option};

const NOT_FOUND: &str = "user_not_found";

/// Query filter for users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub is_staff: Option<bool>,
}

impl Filter for UserFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["full_name", "phone", "email"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.eq("is_staff", self.is_staff)
    }
}

/// Input for creating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
}

/// Input for updating a user.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(email)]
    pub email: Option<Option<String>>,
    pub is_staff: Option<bool>,
}

impl Patch<user::Entity> for UpdateUserInput {
    fn apply_to(self, active: &mut user::ActiveModel) {
        if let Some(full_name) = self.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(phone) = self.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = self.email {
            active.email = Set(email);
        }
        if let Some(is_staff) = self.is_staff {
            active.is_staff = Set(is_staff);
        }
    }
}

/// User as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_staff: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            phone: model.phone,
            email: model.email,
            is_staff: model.is_staff,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<Hydrated<user::Entity>> for UserResponse {
    fn from(row: Hydrated<user::Entity>) -> Self {
        row.model.into()
    }
}

/// Service for managing users.
#[derive(Clone)]
pub struct UserService {
    repo: Repository<user::Entity>,
    order_repo: Repository<order::Entity>,
    request_repo: Repository<request_to_group::Entity>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        repo: Repository<user::Entity>,
        order_repo: Repository<order::Entity>,
        request_repo: Repository<request_to_group::Entity>,
    ) -> Self {
        Self {
            repo,
            order_repo,
            request_repo,
        }
    }

    /// List users matching the filter.
    pub async fn list(&self, filter: &UserFilter) -> AppResult<Vec<UserResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of users matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<UserFilter>,
    ) -> AppResult<Page<UserResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<UserResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create a user with a unique phone.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<UserResponse> {
        input.validate()?;
        self.check_phone(&input.phone, None).await?;

        let model = self
            .repo
            .create(user::ActiveModel {
                full_name: Set(input.full_name),
                phone: Set(input.phone),
                email: Set(input.email),
                is_staff: Set(input.is_staff),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a user.
    pub async fn update(&self, id: i32, input: UpdateUserInput) -> AppResult<UserResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        if let Some(phone) = &input.phone {
            self.check_phone(phone, Some(id)).await?;
        }

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Delete a user.
    ///
    /// A hard delete is refused while the user has orders or reviewed requests.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        if force_delete {
            check_unreferenced(&self.order_repo, "user_id", id, "user_has_orders").await?;
            check_unreferenced(&self.request_repo, "checked_by", id, "user_checked_requests")
                .await?;
        }
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_phone(&self, phone: &str, current_id: Option<i32>) -> AppResult<()> {
        let filters = PredicateSet::new().eq("phone", Some(phone)).into_vec();
        let conflict = first_id(&self.repo, &filters).await?;
        check_unique(conflict, current_id, "user_phone_exists")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_db::Predicate;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service_for(db: Arc<DatabaseConnection>) -> UserService {
        UserService::new(
            Repository::new(Arc::clone(&db)),
            Repository::new(Arc::clone(&db)),
            Repository::new(db),
        )
    }

    fn create_test_user(id: i32, phone: &str) -> user::Model {
        let now = chrono::Utc::now().into();
        user::Model {
            id,
            full_name: "Ivan Petrov".to_string(),
            phone: phone.to_string(),
            email: None,
            is_staff: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_filter_predicates() {
        let filter = UserFilter {
            is_staff: Some(true),
            ..Default::default()
        };
        assert_eq!(
            filter.apply(),
            vec![Predicate::Eq {
                field: "is_staff",
                value: true.into(),
            }]
        );
        assert!(UserFilter::default().apply().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_phone() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user(1, "+79990000000")]])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service
            .create(CreateUserInput {
                full_name: "Another".to_string(),
                phone: "+79990000000".to_string(),
                email: None,
                is_staff: false,
            })
            .await;

        assert_eq!(result.unwrap_err().message_key(), "user_phone_exists");
    }

    #[tokio::test]
    async fn test_update_keeps_own_phone() {
        let user = create_test_user(1, "+79990000000");
        let mut renamed = user.clone();
        renamed.full_name = "Renamed".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user]])
                .append_query_results([[renamed.clone()]])
                .append_query_results([[renamed]])
                .into_connection(),
        );
        let service = service_for(db);

        let response = service
            .update(
                1,
                UpdateUserInput {
                    full_name: Some("Renamed".to_string()),
                    phone: Some("+79990000000".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.full_name, "Renamed");
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_before_queries() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_for(db);

        let result = service
            .create(CreateUserInput {
                full_name: "Ivan".to_string(),
                phone: "+79990000000".to_string(),
                email: Some("not-an-email".to_string()),
                is_staff: false,
            })
            .await;

        assert_eq!(result.unwrap_err().message_key(), "validation_error");
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = service_for(db);

        let result = service.delete(42, false).await;
        assert_eq!(result.unwrap_err().message_key(), NOT_FOUND);
    }
}
