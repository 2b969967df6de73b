//! Storage-backed project repository implementation

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::project::{Project, ProjectId, ProjectRepository};
use crate::domain::storage::{Mutator, Storage};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Storage-backed implementation of ProjectRepository
#[derive(Debug)]
pub struct StorageProjectRepository {
    storage: Arc<dyn Storage<Project>>,
}

impl StorageProjectRepository {
    pub fn new(storage: Arc<dyn Storage<Project>>) -> Self {
        Self { storage }
    }

    async fn edit(
        &self,
        id: &ProjectId,
        edit: Mutator<'_, Project>,
    ) -> Result<Project, DomainError> {
        self.storage
            .update_with(id, edit)
            .await?
            .ok_or_else(|| DomainError::not_found("Project not found"))
    }
}

fn sort_projects(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    projects
}

#[async_trait]
impl ProjectRepository for StorageProjectRepository {
    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        self.storage.get(id).await
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        Ok(sort_projects(self.storage.list().await?))
    }

    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Project>, DomainError> {
        let projects = self.storage.find(&|p: &Project| p.involves(user)).await?;
        Ok(sort_projects(projects))
    }

    async fn create(&self, project: Project) -> Result<Project, DomainError> {
        self.storage.create(project).await
    }

    async fn update(
        &self,
        id: &ProjectId,
        edit: Mutator<'_, Project>,
    ) -> Result<Project, DomainError> {
        self.edit(id, edit).await
    }

    async fn delete(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        self.storage.delete(id).await
    }

    async fn add_member(&self, id: &ProjectId, user: &UserId) -> Result<Project, DomainError> {
        self.edit(
            id,
            Box::new(|project: &mut Project| {
                project.add_member(user.clone());
                Ok(())
            }),
        )
        .await
    }

    async fn remove_member(
        &self,
        id: &ProjectId,
        user: &UserId,
    ) -> Result<Project, DomainError> {
        self.edit(
            id,
            Box::new(|project: &mut Project| {
                project.remove_member(user);
                Ok(())
            }),
        )
        .await
    }
}
