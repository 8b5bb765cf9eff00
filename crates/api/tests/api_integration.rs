//! API integration tests.
//!
//! These tests drive the full router against an in-memory `SQLite` database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;

use arena_api::{AppState, app};
use arena_common::config::{
    Config, DatabaseConfig, I18nConfig, LoggingConfig, PaginationConfig, ServerConfig,
    StorageSettings,
};
use arena_common::{LocalStorage, Locale};
use arena_db::test_utils::TestDatabase;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Create a test configuration.
fn create_test_config(media: PathBuf) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        pagination: PaginationConfig { max_per_page: 5 },
        storage: StorageSettings {
            base_path: media,
            base_url: "/media".to_string(),
            max_image_bytes: 1024,
        },
        i18n: I18nConfig {
            default_locale: Locale::Ru,
        },
        logging: LoggingConfig::default(),
    }
}

async fn create_test_app() -> Router {
    let db = Arc::new(TestDatabase::sqlite().await.unwrap().into_connection());
    let media = std::env::temp_dir().join(format!("arena-api-{}", std::process::id()));
    let config = create_test_config(media.clone());
    let storage = Arc::new(LocalStorage::new(media, config.storage.base_url.clone()));

    app(AppState::new(db, storage, Arc::new(config)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn json_request(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn create(app: &Router, path: &str, body: Value) -> Value {
    let (status, body) = json_request(app, Method::POST, path, body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

async fn create_category(app: &Router, title: &str) -> i64 {
    create(app, "/api/v1/categories", json!({ "title_ru": title }))
        .await["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_category() {
    let app = create_test_app().await;
    let id = create_category(&app, "Мячи").await;

    let (status, body) = get(&app, &format!("/api/v1/categories/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title_ru"], "Мячи");
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"]["deleted_at"].is_null());
}

#[tokio::test]
async fn test_pagination_envelope() {
    let app = create_test_app().await;
    for n in 0..3 {
        create_category(&app, &format!("Category {n}")).await;
    }

    let (status, body) = get(&app, "/api/v1/categories?page=2&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["per_page"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, past_end) = get(&app, "/api/v1/categories?page=9&per_page=2").await;
    assert_eq!(past_end["data"], json!([]));
    assert_eq!(past_end["total"], 3);
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let app = create_test_app().await;
    create_category(&app, "Only").await;

    let (status, body) = get(
        &app,
        "/api/v1/categories?page=18446744073709551615&per_page=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], u64::MAX);

    let (status, _) = get(&app, "/api/v1/categories?page=18446744073709551616&per_page=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hard_delete_of_referenced_category_is_refused() {
    let app = create_test_app().await;
    let id = create_category(&app, "Balls").await;
    create(
        &app,
        "/api/v1/products",
        json!({ "category_id": id, "title": "Ball", "price": 1000 }),
    )
    .await;

    let request = Request::delete(format!("/api/v1/categories/{id}?force_delete=true"))
        .header(header::ACCEPT_LANGUAGE, "en")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["key"], "category_has_products");
    assert_eq!(
        body["error"]["message"],
        "Cannot delete a category that has products"
    );

    let (status, _) = get(&app, &format!("/api/v1/categories/{id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_per_page_is_required_and_clamped() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/api/v1/categories").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = get(&app, "/api/v1/categories?per_page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/v1/categories?per_page=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["per_page"], 5);
}

#[tokio::test]
async fn test_not_found_is_localised() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/api/v1/categories/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["key"], "category_not_found");
    assert_eq!(body["error"]["message"], "Категория не найдена");

    let request = Request::get("/api/v1/categories/999")
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["error"]["message"], "Category not found");
}

#[tokio::test]
async fn test_soft_and_hard_delete() {
    let app = create_test_app().await;
    let id = create_category(&app, "Old").await;

    let request = Request::delete(format!("/api/v1/categories/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/v1/categories/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, visible) = get(&app, "/api/v1/categories/all").await;
    assert_eq!(visible["data"], json!([]));
    let (_, with_deleted) = get(&app, "/api/v1/categories/all?is_show_deleted=true").await;
    assert_eq!(with_deleted["data"].as_array().unwrap().len(), 1);

    // Already soft-deleted
    let request = Request::delete(format!("/api/v1/categories/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::delete(format!("/api/v1/categories/{id}?force_delete=true"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, with_deleted) = get(&app, "/api/v1/categories/all?is_show_deleted=true").await;
    assert_eq!(with_deleted["data"], json!([]));
}

#[tokio::test]
async fn test_repeated_id_keys_filter_products() {
    let app = create_test_app().await;
    let balls = create_category(&app, "Balls").await;
    let nets = create_category(&app, "Nets").await;
    let shoes = create_category(&app, "Shoes").await;
    for (category_id, title) in [(balls, "Ball"), (nets, "Net"), (shoes, "Boots")] {
        create(
            &app,
            "/api/v1/products",
            json!({ "category_id": category_id, "title": title, "price": 1000 }),
        )
        .await;
    }

    let (status, body) = get(
        &app,
        &format!("/api/v1/products/all?category_ids={balls}&category_ids={nets}&order_by=title"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Ball", "Net"]);
    assert_eq!(body["data"][0]["category"]["title_ru"], "Balls");
}

#[tokio::test]
async fn test_modification_type_by_value() {
    let app = create_test_app().await;
    create(
        &app,
        "/api/v1/modification-types",
        json!({ "title_ru": "Размер", "value": "size" }),
    )
    .await;

    let (status, body) = get(&app, "/api/v1/modification-types/by-value/size").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], "size");

    let (status, _) = get(&app, "/api/v1/modification-types/by-value/color").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_review_requires_checker() {
    let app = create_test_app().await;
    let academy = create(
        &app,
        "/api/v1/academies",
        json!({ "title": "Dynamo", "address": "Lenina 1" }),
    )
    .await;
    let group = create(
        &app,
        "/api/v1/groups",
        json!({
            "academy_id": academy["id"],
            "title": "U10",
            "min_age": 8,
            "max_age": 10,
            "capacity": 20
        }),
    )
    .await;
    let request = create(
        &app,
        "/api/v1/requests-to-group",
        json!({ "group_id": group["id"], "full_name": "Petya", "phone": "+79990000000" }),
    )
    .await;
    assert_eq!(request["status"], 0);
    let uri = format!("/api/v1/requests-to-group/{}", request["id"]);

    let (status, body) = json_request(&app, Method::PUT, &uri, json!({ "status": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["key"], "checker_required_for_status_change");

    let checker = create(
        &app,
        "/api/v1/users",
        json!({ "full_name": "Coach", "phone": "+79991112233", "is_staff": true }),
    )
    .await;
    let (status, body) = json_request(
        &app,
        Method::PUT,
        &uri,
        json!({ "status": 1, "checked_by": checker["id"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], 1);
    assert_eq!(body["data"]["checker"]["full_name"], "Coach");

    let (status, body) = json_request(
        &app,
        Method::PUT,
        &uri,
        json!({ "status": 0, "checked_by": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["checked_by"].is_null());
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = create_test_app().await;

    let request = Request::post("/api/v1/categories")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title_ru\":"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_ticket_image() {
    let app = create_test_app().await;
    let ticket = create(
        &app,
        "/api/v1/tickets",
        json!({
            "title": "Derby",
            "widget_url": "https://widget.tickets.yandex.ru/w/event/123",
            "event_date": "2026-05-01T18:00:00+03:00"
        }),
    )
    .await;

    let boundary = "arena-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"poster.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         png-bytes\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::put(format!("/api/v1/tickets/upload-image/{}", ticket["id"]))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["data"]["image_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("/media/tickets/{}/", ticket["id"])));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app().await;

    let (status, body) = get(&app, "/api/v1/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["key"], "not_found");
}
