//! Cache hits must not reach the stores; writes must make the next read fresh

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::app;

#[tokio::test]
async fn test_repeated_task_reads_hit_cache() {
    let app = app();
    let (_, token) = app.client.register("alice").await;
    let project = app.client.create_project(&token, "Cached").await;
    let task = app
        .client
        .create_task(&token, &project, json!({ "title": "Cached task" }))
        .await;
    let path = format!("/api/tasks/{}", task);

    let first = app.client.get(&path, Some(&token)).await;
    assert_eq!(first.status, StatusCode::OK);
    let reads = app.tasks.reads();

    for _ in 0..3 {
        let again = app.client.get(&path, Some(&token)).await;
        assert_eq!(again.body, first.body);
    }

    assert_eq!(app.tasks.reads(), reads);
}

#[tokio::test]
async fn test_listing_reads_store_once_until_write() {
    let app = app();
    let (_, token) = app.client.register("alice").await;
    let project = app.client.create_project(&token, "Cached").await;

    app.client.get("/api/tasks/all", Some(&token)).await;
    let warmed = app.tasks.reads();

    app.client.get("/api/tasks/all", Some(&token)).await;
    assert_eq!(app.tasks.reads(), warmed);

    let task = app
        .client
        .create_task(&token, &project, json!({ "title": "Fresh task" }))
        .await;

    let listing = app.client.get("/api/tasks/all", Some(&token)).await;
    assert_eq!(listing.ids(), vec![task]);
    assert!(app.tasks.reads() > warmed);
}

#[tokio::test]
async fn test_update_is_visible_on_next_read() {
    let app = app();
    let (_, token) = app.client.register("alice").await;
    let project = app.client.create_project(&token, "Cached").await;
    let task = app
        .client
        .create_task(&token, &project, json!({ "title": "Old title" }))
        .await;
    let path = format!("/api/tasks/{}", task);

    assert_eq!(app.client.get(&path, Some(&token)).await.body["title"], "Old title");

    app.client
        .put(&path, Some(&token), json!({ "title": "New title" }))
        .await;

    assert_eq!(app.client.get(&path, Some(&token)).await.body["title"], "New title");
}

#[tokio::test]
async fn test_missing_project_is_not_cached() {
    let app = app();
    let (_, token) = app.client.register("alice").await;
    let path = "/api/projects/00000000-0000-4000-8000-000000000000";

    app.client.get(path, Some(&token)).await;
    let after_first = app.projects.reads();

    let again = app.client.get(path, Some(&token)).await;

    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert!(app.projects.reads() > after_first);
}

#[tokio::test]
async fn test_project_listing_served_from_cache() {
    let app = app();
    let (_, token) = app.client.register("alice").await;
    let project = app.client.create_project(&token, "Cached").await;

    assert_eq!(
        app.client.get("/api/projects/all", Some(&token)).await.ids(),
        vec![project.clone()]
    );
    let reads = app.projects.reads();

    assert_eq!(
        app.client.get("/api/projects/all", Some(&token)).await.ids(),
        vec![project]
    );
    assert_eq!(app.projects.reads(), reads);
}
