//! Domain layer - Core business logic and entities

pub mod cache;
pub mod error;
pub(crate) mod id;
pub mod project;
pub mod storage;
pub mod task;
pub mod user;

pub use cache::{Cache, CacheExt, CacheKey, Invalidation, Mutation};
pub use error::DomainError;
pub use project::{Project, ProjectId, ProjectRepository};
pub use storage::{Mutator, Storage, StorageEntity, StorageKey};
pub use task::{Task, TaskId, TaskQuery, TaskRepository, TaskStatus};
pub use user::{User, UserId, UserRepository};
