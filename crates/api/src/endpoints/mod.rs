//! API endpoints.

mod academies;
mod categories;
mod category_modifications;
mod fields;
mod groups;
mod health;
mod modification_types;
mod orders;
mod products;
mod requests_to_group;
mod tickets;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/modification-types", modification_types::router())
        .nest("/category-modifications", category_modifications::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/academies", academies::router())
        .nest("/fields", fields::router())
        .nest("/groups", groups::router())
        .nest("/requests-to-group", requests_to_group::router())
        .nest("/tickets", tickets::router())
}
