//! Cross-cutting HTTP behaviour: rate limiting, compression, API docs

mod common;

use axum::http::{header, StatusCode};

use common::{app, app_with};

#[tokio::test]
async fn test_client_over_budget_gets_429() {
    let app = app_with(|config| {
        config.rate_limit.max_requests = 2;
        config.rate_limit.trust_forwarded_headers = true;
    });
    let client = [("x-forwarded-for", "203.0.113.7")];

    for _ in 0..2 {
        let ok = app.client.get_raw("/health", &client).await;
        assert_eq!(ok.status, StatusCode::OK);
    }

    let limited = app.client.get_raw("/health", &client).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers.contains_key(header::RETRY_AFTER));

    let body: serde_json::Value = serde_json::from_slice(&limited.body).unwrap();
    assert_eq!(body["statusCode"], 429);
    assert_eq!(body["message"], "Too many requests, please try again later.");

    let other = app
        .client
        .get_raw("/health", &[("x-forwarded-for", "203.0.113.8")])
        .await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_covers_api_routes() {
    let app = app_with(|config| config.rate_limit.max_requests = 1);

    let first = app.client.get("/api/tasks/all", None).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);

    let second = app.client.get("/api/tasks/all", None).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app();

    let response = app.client.get("/openapi.json", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["info"]["title"], "Task Manager API");
    assert!(response.body["paths"]["/api/tasks/{task_id}"].is_object());
    assert!(response.body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_swagger_ui_served() {
    let app = app();

    let response = app.client.get_raw("/api-docs/", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test]
async fn test_responses_gzip_when_accepted() {
    let app = app();

    let compressed = app
        .client
        .get_raw("/openapi.json", &[("accept-encoding", "gzip")])
        .await;
    assert_eq!(compressed.status, StatusCode::OK);
    assert_eq!(compressed.headers[header::CONTENT_ENCODING], "gzip");

    let plain = app.client.get_raw("/openapi.json", &[]).await;
    assert!(!plain.headers.contains_key(header::CONTENT_ENCODING));
    assert!(compressed.body.len() < plain.body.len());
}
