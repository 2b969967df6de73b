//! Task Manager API
//!
//! REST service for users, projects and tasks with:
//! - JWT authentication and Argon2 password hashing
//! - Pluggable storage (in-memory or PostgreSQL)
//! - A read-through cache invalidated on every write

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::middleware::RateLimitState;
use api::state::AppState;
use domain::cache::Cache;
use infrastructure::{
    auth::{JwtConfig, JwtService},
    cache::{InMemoryCache, InMemoryCacheConfig, ReadThroughCache},
    project::{ProjectService, StorageProjectRepository},
    storage::{StorageFactory, Stores},
    task::{StorageTaskRepository, TaskService},
    user::{Argon2Hasher, StorageUserRepository, UserService},
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = config.storage.to_storage_config()?;
    info!(backend = storage_config.backend_name(), "Initializing storage");

    let stores = StorageFactory::create(&storage_config).await?;

    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::with_config(
        InMemoryCacheConfig::default()
            .with_max_capacity(config.cache.max_capacity)
            .with_default_ttl(Duration::from_secs(config.cache.default_ttl_secs)),
    ));

    Ok(build_app_state(config, stores, cache))
}

/// Wire services over the given stores and cache
pub fn build_app_state(config: &AppConfig, stores: Stores, cache: Arc<dyn Cache>) -> AppState {
    if config.auth.uses_default_secret() {
        warn!("auth.jwt_secret is the built-in default; set APP__AUTH__JWT_SECRET");
    }

    let read_through = ReadThroughCache::new(cache.clone());

    let users = Arc::new(StorageUserRepository::new(stores.users.clone()));
    let projects = Arc::new(StorageProjectRepository::new(stores.projects.clone()));
    let tasks = Arc::new(StorageTaskRepository::new(stores.tasks.clone()));

    let user_service = Arc::new(UserService::new(
        users,
        Arc::new(Argon2Hasher::new()),
        read_through.clone(),
    ));
    let project_service = Arc::new(ProjectService::new(
        projects.clone(),
        tasks.clone(),
        read_through.clone(),
    ));
    let task_service = Arc::new(TaskService::new(tasks, projects, read_through));

    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_hours,
    )));

    AppState {
        user_service,
        project_service,
        task_service,
        jwt_service,
        rate_limit: RateLimitState::new(&config.rate_limit),
        stores,
        cache,
    }
}
