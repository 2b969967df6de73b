//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::project::Project;
use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{PostgresConfig, PostgresStorage};

pub const USERS_TABLE: &str = "users";
pub const PROJECTS_TABLE: &str = "projects";
pub const TASKS_TABLE: &str = "tasks";

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL JSONB tables
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

/// The three entity stores the application needs
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn Storage<User>>,
    pub projects: Arc<dyn Storage<Project>>,
    pub tasks: Arc<dyn Storage<Task>>,
}

impl Stores {
    /// Fresh in-memory stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryStorage::<User>::new()),
            projects: Arc::new(InMemoryStorage::<Project>::new()),
            tasks: Arc::new(InMemoryStorage::<Task>::new()),
        }
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates every entity store for the configured backend
    pub async fn create(config: &StorageConfig) -> Result<Stores, DomainError> {
        info!(backend = config.backend_name(), "Initializing storage");

        match config {
            StorageConfig::InMemory => Ok(Stores::in_memory()),
            StorageConfig::Postgres(pg_config) => {
                let pool = pg_config.connect().await?;

                Ok(Stores {
                    users: Self::postgres_table::<User>(&pool, USERS_TABLE).await?,
                    projects: Self::postgres_table::<Project>(&pool, PROJECTS_TABLE).await?,
                    tasks: Self::postgres_table::<Task>(&pool, TASKS_TABLE).await?,
                })
            }
        }
    }

    async fn postgres_table<E>(
        pool: &sqlx::PgPool,
        table_name: &str,
    ) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        let storage = PostgresStorage::<E>::new(pool.clone(), table_name);
        storage.ensure_table().await?;
        Ok(Arc::new(storage))
    }
}
