//! Application state and API middleware.

use std::sync::Arc;

use arena_common::error::ErrorReport;
use arena_common::{AppError, Config, Locale, StorageBackend};
use arena_core::{
    AcademyService, CategoryModificationService, CategoryService, FieldService, GroupService,
    ModificationTypeService, OrderService, ProductService, RequestToGroupService, TicketService,
    UserService,
};
use arena_db::{Repository, Schema};
use axum::{
    body::Body,
    extract::State,
    http::{Request, header::ACCEPT_LANGUAGE},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub modification_type_service: ModificationTypeService,
    pub category_modification_service: CategoryModificationService,
    pub product_service: ProductService,
    pub order_service: OrderService,
    pub academy_service: AcademyService,
    pub field_service: FieldService,
    pub group_service: GroupService,
    pub request_to_group_service: RequestToGroupService,
    pub ticket_service: TicketService,
}

impl AppState {
    /// Wire every service onto one shared connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn StorageBackend>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            user_service: UserService::new(repo(&db), repo(&db), repo(&db)),
            category_service: CategoryService::new(repo(&db), repo(&db)),
            modification_type_service: ModificationTypeService::new(repo(&db), repo(&db)),
            category_modification_service: CategoryModificationService::new(
                repo(&db),
                repo(&db),
                repo(&db),
            ),
            product_service: ProductService::new(repo(&db), repo(&db), repo(&db)),
            order_service: OrderService::new(repo(&db), repo(&db), repo(&db)),
            academy_service: AcademyService::new(repo(&db)),
            field_service: FieldService::new(repo(&db), repo(&db)),
            group_service: GroupService::new(repo(&db), repo(&db)),
            request_to_group_service: RequestToGroupService::new(repo(&db), repo(&db), repo(&db)),
            ticket_service: TicketService::new(repo(&db), storage, config.storage.max_image_bytes),
            db: Arc::clone(&db),
            config,
        }
    }

    /// Locale for a request, from `Accept-Language` or the configured default.
    #[must_use]
    pub fn locale_for(&self, accept_language: Option<&str>) -> Locale {
        accept_language
            .and_then(Locale::from_accept_language)
            .unwrap_or(self.config.i18n.default_locale)
    }
}

fn repo<E: Schema>(db: &Arc<DatabaseConnection>) -> Repository<E> {
    Repository::new(Arc::clone(db))
}

/// Re-render error bodies in the request's language.
pub async fn localize_errors(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let locale = state.locale_for(
        req.headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    );

    let response = next.run(req).await;
    match response.extensions().get::<ErrorReport>() {
        Some(report) => report.render(locale),
        None => response,
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::not_found("not_found")
}
