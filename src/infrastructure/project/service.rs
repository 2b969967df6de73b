//! Project service - CRUD, membership and cascade delete for projects

use std::sync::Arc;

use tracing::info;

use crate::domain::cache::{CacheKey, Mutation};
use crate::domain::project::{Project, ProjectId, ProjectRepository};
use crate::domain::task::TaskRepository;
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::cache::ReadThroughCache;

/// Request to create a new project
#[derive(Debug, Clone)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request to update an existing project
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateProjectRequest {
    fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.set_name(name);
        }

        if self.description.is_some() {
            project.set_description(self.description);
        }
    }
}

/// Project service with read-through caching
#[derive(Debug)]
pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    cache: ReadThroughCache,
}

impl ProjectService {
    pub fn new(
        repository: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        cache: ReadThroughCache,
    ) -> Self {
        Self {
            repository,
            tasks,
            cache,
        }
    }

    /// Create a project owned by `owner` with no members
    pub async fn create(
        &self,
        request: CreateProjectRequest,
        owner: UserId,
    ) -> Result<Project, DomainError> {
        let project = Project::new(request.name, request.description, owner);

        self.cache
            .invalidate(&Mutation::ProjectCreated { project: &project })
            .await;

        let project = self.repository.create(project).await?;

        self.cache
            .invalidate(&Mutation::ProjectCreated { project: &project })
            .await;

        info!(project_id = %project.id(), owner = %project.owner(), "Project created");

        Ok(project)
    }

    pub async fn get(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load_optional(CacheKey::Project(id.clone()), || repository.get(id))
            .await
    }

    /// Get a project, returning an error if not found
    pub async fn get_required(&self, id: &ProjectId) -> Result<Project, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Project not found"))
    }

    pub async fn list_all(&self) -> Result<Vec<Project>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::AllProjects, || repository.list())
            .await
    }

    /// Projects the user owns or is a member of
    pub async fn list_for_user(&self, user: &UserId) -> Result<Vec<Project>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::ProjectsByUser(user.clone()), || {
                repository.list_by_user(user)
            })
            .await
    }

    pub async fn update(
        &self,
        id: &ProjectId,
        request: UpdateProjectRequest,
    ) -> Result<Project, DomainError> {
        let before = self.load(id).await?;
        let mut planned = before.clone();
        request.clone().apply(&mut planned);

        self.cache
            .invalidate(&Mutation::ProjectUpdated {
                before: &before,
                after: &planned,
            })
            .await;

        let project = self
            .repository
            .update(id, Box::new(move |project: &mut Project| {
                request.apply(project);
                Ok(())
            }))
            .await?;

        self.cache
            .invalidate(&Mutation::ProjectUpdated {
                before: &before,
                after: &project,
            })
            .await;

        info!(project_id = %project.id(), "Project updated");

        Ok(project)
    }

    /// Delete a project and every task that belongs to it
    pub async fn delete(&self, id: &ProjectId) -> Result<Project, DomainError> {
        let project = self.load(id).await?;
        let tasks = self.tasks.list_by_project(id).await?;

        self.cache
            .invalidate(&Mutation::ProjectDeleted {
                project: &project,
                tasks: &tasks,
            })
            .await;

        let removed = self.tasks.delete_by_project(id).await?;
        let project = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Project not found"))?;

        self.cache
            .invalidate(&Mutation::ProjectDeleted {
                project: &project,
                tasks: &removed,
            })
            .await;

        info!(project_id = %project.id(), removed_tasks = removed.len(), "Project deleted");

        Ok(project)
    }

    pub async fn add_member(&self, id: &ProjectId, user: &UserId) -> Result<Project, DomainError> {
        let project = self.load(id).await?;

        self.cache
            .invalidate(&Mutation::ProjectMembershipChanged {
                project: &project,
                member: user,
            })
            .await;

        let project = self.repository.add_member(id, user).await?;

        self.cache
            .invalidate(&Mutation::ProjectMembershipChanged {
                project: &project,
                member: user,
            })
            .await;

        info!(project_id = %project.id(), member = %user, "Project member added");

        Ok(project)
    }

    pub async fn remove_member(
        &self,
        id: &ProjectId,
        user: &UserId,
    ) -> Result<Project, DomainError> {
        let project = self.load(id).await?;

        self.cache
            .invalidate(&Mutation::ProjectMembershipChanged {
                project: &project,
                member: user,
            })
            .await;

        let project = self.repository.remove_member(id, user).await?;

        self.cache
            .invalidate(&Mutation::ProjectMembershipChanged {
                project: &project,
                member: user,
            })
            .await;

        info!(project_id = %project.id(), member = %user, "Project member removed");

        Ok(project)
    }

    /// Current store state; write paths never compute fan-out from the cache
    async fn load(&self, id: &ProjectId) -> Result<Project, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Project not found"))
    }
}
