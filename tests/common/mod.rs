//! Shared helpers for HTTP-level tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use task_manager::api::{create_router, AppState};
use task_manager::domain::storage::{Filter, Mutator, Storage, StorageEntity};
use task_manager::domain::{Cache, DomainError, Project, Task, User};
use task_manager::infrastructure::cache::InMemoryCache;
use task_manager::infrastructure::storage::{InMemoryStorage, Stores};
use task_manager::{build_app_state, AppConfig};

/// In-memory store that counts reads reaching it
#[derive(Debug)]
pub struct CountingStorage<E: StorageEntity + 'static> {
    inner: InMemoryStorage<E>,
    reads: AtomicUsize,
}

impl<E: StorageEntity + 'static> CountingStorage<E> {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStorage::new(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<E: StorageEntity + 'static> Storage<E> for CountingStorage<E> {
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        self.record();
        self.inner.get(key).await
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        self.record();
        self.inner.list().await
    }

    async fn find(&self, filter: Filter<'_, E>) -> Result<Vec<E>, DomainError> {
        self.record();
        self.inner.find(filter).await
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        self.inner.create(entity).await
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        self.inner.update(entity).await
    }

    async fn update_with(
        &self,
        key: &E::Key,
        mutate: Mutator<'_, E>,
    ) -> Result<Option<E>, DomainError> {
        self.inner.update_with(key, mutate).await
    }

    async fn delete(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        self.inner.delete(key).await
    }
}

/// Test application with handles on its stores
pub struct TestApp {
    pub client: TestClient,
    pub tasks: Arc<CountingStorage<Task>>,
    pub projects: Arc<CountingStorage<Project>>,
    pub state: AppState,
}

/// App with rate limiting off, so flows are not cut short
pub fn app() -> TestApp {
    app_with(|config| config.rate_limit.enabled = false)
}

pub fn app_with(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let tasks = Arc::new(CountingStorage::<Task>::new());
    let projects = Arc::new(CountingStorage::<Project>::new());

    let stores = Stores {
        users: Arc::new(InMemoryStorage::<User>::new()),
        projects: projects.clone(),
        tasks: tasks.clone(),
    };
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    configure(&mut config);

    let state = build_app_state(&config, stores, cache);

    TestApp {
        client: TestClient::new(create_router(state.clone())),
        tasks,
        projects,
        state,
    }
}

pub struct TestClient {
    app: Router,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// GET with extra headers, keeping the raw response
    pub async fn get_raw(&self, uri: &str, headers: &[(&str, &str)]) -> RawResponse {
        let mut builder = Request::builder().method(Method::GET).uri(uri);

        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        RawResponse {
            status,
            headers,
            body,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Register a user and return `(id, token)`
    pub async fn register(&self, username: &str) -> (String, String) {
        let response = self
            .post(
                "/api/users/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret123"
                }),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        (
            response.body["user"]["id"].as_str().unwrap().to_string(),
            response.body["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_project(&self, token: &str, name: &str) -> String {
        let response = self
            .post("/api/projects", Some(token), json!({ "name": name }))
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["project"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_task(&self, token: &str, project: &str, body: Value) -> String {
        let mut payload = body;
        payload["project"] = json!(project);

        let response = self.post("/api/tasks", Some(token), payload).await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["task"]["id"].as_str().unwrap().to_string()
    }
}

#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn ids(&self) -> Vec<String> {
        self.body
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
