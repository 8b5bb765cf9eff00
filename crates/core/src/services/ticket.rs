//! Event ticket service.
//!
//! Tickets are sold through an embedded Yandex ticket widget; the service
//! stores the widget link and a poster image kept in file storage.

use std::sync::Arc;

use arena_common::{AppError, AppResult, StorageBackend, generate_storage_key};
use arena_db::entities::ticket;
use arena_db::{BaseFilter, Filter, Hydrated, Page, PaginationFilter, Patch, PredicateSet, Repository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::{current, fetch, list_rows, paginate_rows, remove};
use crate::validation::double_option;

const NOT_FOUND: &str = "ticket_not_found";

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Query filter for tickets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketFilter {
    #[serde(skip)]
    pub base: BaseFilter,
    pub is_active: Option<bool>,
    pub event_from: Option<DateTimeWithTimeZone>,
    pub event_to: Option<DateTimeWithTimeZone>,
}

impl Filter for TicketFilter {
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
        set.eq("is_active", self.is_active)
            .range("event_date", self.event_from, self.event_to)
    }
}

/// Input for creating a ticket.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url)]
    pub widget_url: String,
    pub event_date: DateTimeWithTimeZone,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Input for updating a ticket.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTicketInput {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(url)]
    pub widget_url: Option<String>,
    pub event_date: Option<DateTimeWithTimeZone>,
    pub is_active: Option<bool>,
}

impl Patch<ticket::Entity> for UpdateTicketInput {
    fn apply_to(self, active: &mut ticket::ActiveModel) {
        if let Some(title) = self.title {
            active.title = Set(title);
        }
        if let Some(description) = self.description {
            active.description = Set(description);
        }
        if let Some(widget_url) = self.widget_url {
            active.widget_url = Set(widget_url);
        }
        if let Some(event_date) = self.event_date {
            active.event_date = Set(event_date);
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
    }
}

/// Uploaded poster image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

struct ImagePatch {
    key: String,
    url: String,
}

impl Patch<ticket::Entity> for ImagePatch {
    fn apply_to(self, active: &mut ticket::ActiveModel) {
        active.image_key = Set(Some(self.key));
        active.image_url = Set(Some(self.url));
    }
}

/// Ticket as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TicketResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub widget_url: String,
    pub image_url: Option<String>,
    pub event_date: DateTimeWithTimeZone,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<Hydrated<ticket::Entity>> for TicketResponse {
    fn from(row: Hydrated<ticket::Entity>) -> Self {
        let model = row.model;
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            widget_url: model.widget_url,
            image_url: model.image_url,
            event_date: model.event_date,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Service for managing tickets.
#[derive(Clone)]
pub struct TicketService {
    repo: Repository<ticket::Entity>,
    storage: Arc<dyn StorageBackend>,
    max_image_bytes: usize,
}

impl TicketService {
    /// Create a new ticket service.
    #[must_use]
    pub fn new(
        repo: Repository<ticket::Entity>,
        storage: Arc<dyn StorageBackend>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            repo,
            storage,
            max_image_bytes,
        }
    }

    /// List tickets matching the filter.
    pub async fn list(&self, filter: &TicketFilter) -> AppResult<Vec<TicketResponse>> {
        list_rows(&self.repo, filter).await
    }

    /// One page of tickets matching the filter.
    pub async fn paginate(
        &self,
        filter: &PaginationFilter<TicketFilter>,
    ) -> AppResult<Page<TicketResponse>> {
        paginate_rows(&self.repo, filter).await
    }

    /// Get a ticket by ID.
    pub async fn get_by_id(&self, id: i32) -> AppResult<TicketResponse> {
        fetch(&self.repo, id, NOT_FOUND).await
    }

    /// Create a ticket.
    pub async fn create(&self, input: CreateTicketInput) -> AppResult<TicketResponse> {
        input.validate()?;

        let model = self
            .repo
            .create(ticket::ActiveModel {
                title: Set(input.title),
                description: Set(input.description),
                widget_url: Set(input.widget_url),
                image_key: Set(None),
                image_url: Set(None),
                event_date: Set(input.event_date),
                is_active: Set(input.is_active),
                ..Default::default()
            })
            .await?;

        self.get_by_id(model.id).await
    }

    /// Update a ticket.
    pub async fn update(&self, id: i32, input: UpdateTicketInput) -> AppResult<TicketResponse> {
        input.validate()?;
        let model = current(&self.repo, id, NOT_FOUND).await?;

        self.repo.update(model, input).await?;
        self.get_by_id(id).await
    }

    /// Store a poster image for a ticket, replacing the previous one.
    pub async fn upload_image(&self, id: i32, image: ImageUpload) -> AppResult<TicketResponse> {
        if image.data.is_empty() {
            return Err(AppError::bad_request("image_required"));
        }
        if !IMAGE_TYPES.contains(&image.content_type.as_str()) {
            return Err(AppError::bad_request("unsupported_image_type"));
        }
        if image.data.len() > self.max_image_bytes {
            return Err(AppError::bad_request("image_too_large"));
        }

        let model = current(&self.repo, id, NOT_FOUND).await?;
        let previous = model.image_key.clone();

        let key = generate_storage_key(&format!("tickets/{id}"), &image.file_name);
        let uploaded = self
            .storage
            .upload(&key, &image.data, &image.content_type)
            .await?;

        let patch = ImagePatch {
            key: uploaded.key.clone(),
            url: uploaded.url,
        };
        if let Err(e) = self.repo.update(model, patch).await {
            if let Err(cleanup) = self.storage.delete(&uploaded.key).await {
                warn!(key = %uploaded.key, error = %cleanup, "Failed to remove orphaned image");
            }
            return Err(e);
        }
        info!(ticket_id = id, key = %uploaded.key, size = uploaded.size, "Stored ticket image");

        if let Some(previous) = previous {
            if let Err(e) = self.storage.delete(&previous).await {
                warn!(key = %previous, error = %e, "Failed to remove replaced image");
            }
        }

        self.get_by_id(id).await
    }

    /// Delete a ticket; a hard delete also removes its image.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<()> {
        let image_key = if force_delete {
            self.repo
                .get(id, &[], true)
                .await?
                .and_then(|row| row.model.image_key)
        } else {
            None
        };

        remove(&self.repo, id, force_delete, NOT_FOUND).await?;

        if let Some(key) = image_key {
            if let Err(e) = self.storage.delete(&key).await {
                warn!(key = %key, error = %e, "Failed to remove ticket image");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arena_common::UploadedFile;
    use arena_db::test_utils::TestDatabase;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStorage {
        fn keys(&self) -> Vec<String> {
            self.files.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait::async_trait]
    impl StorageBackend for MemoryStorage {
        async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
            self.files
                .lock()
                .unwrap()
                .insert(key.to_string(), data.to_vec());
            Ok(UploadedFile {
                key: key.to_string(),
                url: self.public_url(key),
                size: data.len() as u64,
                content_type: content_type.to_string(),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.files.lock().unwrap().remove(key);
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/media/{key}")
        }
    }

    async fn setup() -> (TicketService, Arc<MemoryStorage>) {
        let db = Arc::new(TestDatabase::sqlite().await.unwrap().into_connection());
        let storage = Arc::new(MemoryStorage::default());
        let service = TicketService::new(Repository::new(db), storage.clone(), 1024);
        (service, storage)
    }

    async fn create_ticket(service: &TicketService) -> TicketResponse {
        service
            .create(CreateTicketInput {
                title: "Derby".to_string(),
                description: None,
                widget_url: "https://widget.tickets.yandex.ru/w/event/123".to_string(),
                event_date: chrono::Utc::now().into(),
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn png(size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "poster.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0; size],
        }
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_image() {
        let (service, storage) = setup().await;
        let ticket = create_ticket(&service).await;

        let first = service.upload_image(ticket.id, png(10)).await.unwrap();
        let first_url = first.image_url.unwrap();
        assert!(first_url.starts_with(&format!("/media/tickets/{}/", ticket.id)));

        let second = service.upload_image(ticket.id, png(20)).await.unwrap();
        assert_ne!(second.image_url.as_deref(), Some(first_url.as_str()));
        assert_eq!(storage.keys().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_images() {
        let (service, storage) = setup().await;
        let ticket = create_ticket(&service).await;

        let empty = service.upload_image(ticket.id, png(0)).await;
        assert_eq!(empty.unwrap_err().message_key(), "image_required");

        let large = service.upload_image(ticket.id, png(2048)).await;
        assert_eq!(large.unwrap_err().message_key(), "image_too_large");

        let mut pdf = png(10);
        pdf.content_type = "application/pdf".to_string();
        let pdf = service.upload_image(ticket.id, pdf).await;
        assert_eq!(pdf.unwrap_err().message_key(), "unsupported_image_type");

        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_for_missing_ticket() {
        let (service, storage) = setup().await;

        let result = service.upload_image(404, png(10)).await;
        assert_eq!(result.unwrap_err().message_key(), NOT_FOUND);
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_hard_delete_removes_image() {
        let (service, storage) = setup().await;
        let ticket = create_ticket(&service).await;
        service.upload_image(ticket.id, png(10)).await.unwrap();

        service.delete(ticket.id, true).await.unwrap();
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_widget_url() {
        let (service, _) = setup().await;

        let result = service
            .create(CreateTicketInput {
                title: "Derby".to_string(),
                description: None,
                widget_url: "not a url".to_string(),
                event_date: chrono::Utc::now().into(),
                is_active: true,
            })
            .await;
        assert_eq!(result.unwrap_err().message_key(), "validation_error");
    }
}
