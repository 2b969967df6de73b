//! Project repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Project, ProjectId};
use crate::domain::storage::Mutator;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for project storage
///
/// Lists are ordered by creation time and never absent: no match is an
/// empty list.
#[async_trait]
pub trait ProjectRepository: Send + Sync + Debug {
    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;

    async fn list(&self) -> Result<Vec<Project>, DomainError>;

    /// Projects the user owns or is a member of
    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Project>, DomainError>;

    async fn create(&self, project: Project) -> Result<Project, DomainError>;

    /// Apply an edit atomically; NotFound if the project does not exist
    async fn update(
        &self,
        id: &ProjectId,
        edit: Mutator<'_, Project>,
    ) -> Result<Project, DomainError>;

    /// Delete a project, returning it if it existed
    async fn delete(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;

    /// Add a member (no-op if already present)
    async fn add_member(&self, id: &ProjectId, user: &UserId) -> Result<Project, DomainError>;

    /// Remove a member (no-op if absent)
    async fn remove_member(&self, id: &ProjectId, user: &UserId)
    -> Result<Project, DomainError>;
}
