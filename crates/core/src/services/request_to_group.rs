//! Request-to-group service.
//!
//! Requests start unreviewed. Accepting or rejecting one needs a reviewer
//! (`checked_by`); putting a reviewed request back into review needs the
//! reviewer to be cleared in the same update.

use arena_common::AppResult;
use arena_db::entities::request_to_group::{self, RequestStatus};
use arena_db::entities::{group, user};
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveEnum, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{GroupResponse, UserResponse};
use super::{current, fetch, list_rows, paginate_rows, remove};
use crate::validation::{check_reference, check_status_transition, double_option};

const NOT_FOUND: &str = "request_to_group_not_found";

/// Query filter for requests to groups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestToGroupFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub group_ids: Vec<i32>,
    pub statuses: Vec<RequestStatus>,
    pub checked_by_ids: Vec<i32>,
}

impl Filter for RequestToGroupFilter {
    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        &["full_name", "phone"]
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set.any_of("group_id", self.group_ids.iter().copied())
            .any_of("status", self.statuses.iter().map(|status| status.to_value()))
            .any_of("checked_by", self.checked_by_ids.iter().copied())
    }
}

/// Input for submitting a request to a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequestToGroupInput {
    #[validate(range(min = 1))]
    pub group_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[validate(range(min = 1))]
    pub checked_by: Option<i32>,
    pub comment: Option<String>,
}

/// Input for updating a request to a group.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRequestToGroupInput {
    #[validate(range(min = 1))]
    pub group_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    pub status: Option<RequestStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub checked_by: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub comment: Option<Option<String>>,
}

impl Patch<request_to_group::Entity> for UpdateRequestToGroupInput {
    fn apply_to(self, active: &mut request_to_group::ActiveModel) {
        if let Some(group_id) = self.group_id {
            active.group_id = Set(group_id);
        }
        if let Some(full_name) = self.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(phone) = self.phone {
            active.phone = Set(phone);
        }
        if let Some(status) = self.status {
            active.status = Set(status);
        }
        if let Some(checked_by) = self.checked_by {
            active.checked_by = Set(checked_by);
        }
        if let Some(comment) = self.comment {
            active.comment = Set(comment);
        }
    }
}

/// Request to a group as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct RequestToGroupResponse {
    pub id: i32,
    pub group_id: i32,
    pub full_name: String,
    pub phone: String,
    pub status: RequestStatus,
    pub checked_by: Option<i32>,
    pub comment: Option<String>,
    pub group: Option<GroupResponse>,
    pub checker: Option<UserResponse>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<Hydrated<request_to_group::Entity>> for RequestToGroupResponse {
    fn from(row: Hydrated<request_to_group::Entity>) -> Self {
        let Hydrated { model, related } = row;
        Self {
            id: model.id,
            group_id: model.group_id,
            full_name: model.full_name,
            phone: model.phone,
            status: model.status,
            checked_by: model.checked_by,
            comment: model.comment,
            group: related.group.map(Into::into),
            checker: related.checker.map(Into::into),
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Service for managing requests to groups.
#[derive(Clone)]
pub struct RequestToGroupService {
    repo: Repository<request_to_group::Entity>,
    group_repo: Repository<group::Entity>,
    user_repo: Repository<user::Entity>,
}

impl RequestToGroupService {
    /// Create a new request-to-group service.
    #[must_use]
    pub const fn new(
        repo: Repository<request_to_group::Entity>,
        group_repo: Repository<group::Entity>,
        user_repo: Repository<user::Entity>,
    ) -> Self {
        Self {
            repo,
            group_repo,
            user_repo,
        }
    }

    /// List requests matching the filter.
    pub async fn list(
        &self,
        filter: &RequestToGroupFilter,
    ) -> AppResult<Vec<RequestToGroupResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of requests matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<RequestToGroupFilter>,
    ) -> AppResult<Page<RequestToGroupResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a request by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<RequestToGroupResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Submit a request; it may be created already reviewed if a reviewer is given.
    pub async fn create(
        &self,
        input: CreateRequestToGroupInput,
    ) -> AppResult<RequestToGroupResponse> {
        input.validate()?;
        check_status_transition(
            RequestStatus::Unreviewed,
            None,
            Some(input.status),
            Some(input.checked_by),
        )?;
        self.check_group(input.group_id).await?;
        if let Some(checker) = input.checked_by {
            self.check_checker(checker).await?;
        }

        let model = self
            .repo
            .create(request_to_group::ActiveModel {
                group_id: Set(input.group_id),
                full_name: Set(input.full_name),
                phone: Set(input.phone),
                status: Set(input.status),
                checked_by: Set(input.checked_by),
                comment: Set(input.comment),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a request, enforcing the review workflow.
    pub async fn update(
        &self,
        id: i32,
        input: UpdateRequestToGroupInput,
    ) -> AppResult<RequestToGroupResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;
        check_status_transition(model.status, model.checked_by, input.status, input.checked_by)?;
        if let Some(group_id) = input.group_id {
            self.check_group(group_id).await?;
        }
        if let Some(Some(checker)) = input.checked_by {
            self.check_checker(checker).await?;
        }

        let previous = model.status;
        let model = self.repo.update(model, input).await?;
        if model.status != previous {
            info!(
                request_id = id,
                from = i32::from(previous),
                to = i32::from(model.status),
                checked_by = ?model.checked_by,
                "Request status changed"
            );
        }

        self.get_by_id(id).await
    }

    /// Delete a request.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        remove(&self.repo, id, force_delete, NOT_FOUND).await
    }

    async fn check_group(&self, group_id: i32) -> AppResult<()> {
        check_reference(self.group_repo.exists(group_id).await?, "group_not_found")
    }

    async fn check_checker(&self, user_id: i32) -> AppResult<()> {
        check_reference(self.user_repo.exists(user_id).await?, "checker_not_found")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_db::entities::academy;
    use arena_db::test_utils::TestDatabase;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    use crate::services::UserService;

    struct Fixture {
        db: Arc<DatabaseConnection>,
        service: RequestToGroupService,
        group_id: i32,
        checker_id: i32,
    }

    async fn setup() -> Fixture {
        let db = Arc::new(TestDatabase::sqlite().await.unwrap().into_connection());
        let group_repo = Repository::<group::Entity>::new(Arc::clone(&db));
        let user_repo = Repository::<user::Entity>::new(Arc::clone(&db));

        let academy = Repository::<academy::Entity>::new(Arc::clone(&db))
            .create(academy::ActiveModel {
                title: Set("Dynamo".to_string()),
                description: Set(None),
                address: Set("Lenina 1".to_string()),
                phone: Set(None),
                is_active: Set(true),
                ..Default::default()
            })
            .await
            .unwrap();
        let group = group_repo
            .create(group::ActiveModel {
                academy_id: Set(academy.id),
                title: Set("U10".to_string()),
                coach_name: Set(None),
                min_age: Set(8),
                max_age: Set(10),
                capacity: Set(20),
                ..Default::default()
            })
            .await
            .unwrap();
        let checker = user_repo
            .create(user::ActiveModel {
                full_name: Set("Coach".to_string()),
                phone: Set("+79991112233".to_string()),
                email: Set(None),
                is_staff: Set(true),
                ..Default::default()
            })
            .await
            .unwrap();

        Fixture {
            service: RequestToGroupService::new(
                Repository::new(Arc::clone(&db)),
                group_repo,
                user_repo,
            ),
            group_id: group.id,
            checker_id: checker.id,
            db,
        }
    }

    async fn submit(f: &Fixture) -> RequestToGroupResponse {
        f.service
            .create(CreateRequestToGroupInput {
                group_id: f.group_id,
                full_name: "Petya Ivanov".to_string(),
                phone: "+79990000000".to_string(),
                status: RequestStatus::Unreviewed,
                checked_by: None,
                comment: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_accept_without_checker_is_rejected() {
        let f = setup().await;
        let request = submit(&f).await;

        let result = f
            .service
            .update(
                request.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Accepted),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(
            result.unwrap_err().message_key(),
            "checker_required_for_status_change"
        );

        let unchanged = f.service.get_by_id(request.id).await.unwrap();
        assert_eq!(unchanged.status, RequestStatus::Unreviewed);
    }

    #[tokio::test]
    async fn test_full_review_cycle() {
        let f = setup().await;
        let request = submit(&f).await;

        let accepted = f
            .service
            .update(
                request.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Accepted),
                    checked_by: Some(Some(f.checker_id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert_eq!(accepted.checker.map(|c| c.id), Some(f.checker_id));

        let reset_keeping_checker = f
            .service
            .update(
                request.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Unreviewed),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(
            reset_keeping_checker.unwrap_err().message_key(),
            "cannot_reset_reviewed_request"
        );

        let reset = f
            .service
            .update(
                request.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Unreviewed),
                    checked_by: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reset.status, RequestStatus::Unreviewed);
        assert!(reset.checked_by.is_none());
        assert!(reset.checker.is_none());
    }

    #[tokio::test]
    async fn test_unknown_checker_is_rejected() {
        let f = setup().await;
        let request = submit(&f).await;

        let result = f
            .service
            .update(
                request.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Rejected),
                    checked_by: Some(Some(999)),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(result.unwrap_err().message_key(), "checker_not_found");
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let f = setup().await;
        let first = submit(&f).await;
        submit(&f).await;
        f.service
            .update(
                first.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Rejected),
                    checked_by: Some(Some(f.checker_id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let rejected = f
            .service
            .list(&RequestToGroupFilter {
                statuses: vec![RequestStatus::Rejected],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            rejected.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![first.id]
        );
    }

    #[tokio::test]
    async fn test_checker_of_reviewed_request_cannot_be_hard_deleted() {
        let f = setup().await;
        let request = submit(&f).await;
        f.service
            .update(
                request.id,
                UpdateRequestToGroupInput {
                    status: Some(RequestStatus::Accepted),
                    checked_by: Some(Some(f.checker_id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let users = UserService::new(
            Repository::new(Arc::clone(&f.db)),
            Repository::new(Arc::clone(&f.db)),
            Repository::new(Arc::clone(&f.db)),
        );

        let result = users.delete(f.checker_id, true).await;
        assert_eq!(result.unwrap_err().message_key(), "user_checked_requests");

        let kept = f.service.get_by_id(request.id).await.unwrap();
        assert_eq!(kept.status, RequestStatus::Accepted);
        assert_eq!(kept.checked_by, Some(f.checker_id));

        // Soft delete keeps the row, so the reviewer stays attached
        users.delete(f.checker_id, false).await.unwrap();
        let kept = f.service.get_by_id(request.id).await.unwrap();
        assert_eq!(kept.checked_by, Some(f.checker_id));
        assert!(kept.checker.is_some_and(|c| c.deleted_at.is_some()));
    }
}
