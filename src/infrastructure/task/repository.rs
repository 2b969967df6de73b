//! Storage-backed task repository implementation

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::project::ProjectId;
use crate::domain::storage::{Mutator, Storage};
use crate::domain::task::{Task, TaskId, TaskQuery, TaskRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Storage-backed implementation of TaskRepository
#[derive(Debug)]
pub struct StorageTaskRepository {
    storage: Arc<dyn Storage<Task>>,
}

impl StorageTaskRepository {
    pub fn new(storage: Arc<dyn Storage<Task>>) -> Self {
        Self { storage }
    }

    async fn edit(&self, id: &TaskId, edit: Mutator<'_, Task>) -> Result<Task, DomainError> {
        self.storage
            .update_with(id, edit)
            .await?
            .ok_or_else(|| DomainError::not_found("Task not found"))
    }
}

fn sort_tasks(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    tasks
}

#[async_trait]
impl TaskRepository for StorageTaskRepository {
    async fn get(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        self.storage.get(id).await
    }

    async fn list(&self) -> Result<Vec<Task>, DomainError> {
        Ok(sort_tasks(self.storage.list().await?))
    }

    async fn find(&self, query: &TaskQuery) -> Result<Vec<Task>, DomainError> {
        let tasks = self.storage.find(&|t: &Task| query.matches(t)).await?;
        Ok(sort_tasks(tasks))
    }

    async fn create(&self, task: Task) -> Result<Task, DomainError> {
        self.storage.create(task).await
    }

    async fn update(&self, id: &TaskId, edit: Mutator<'_, Task>) -> Result<Task, DomainError> {
        self.edit(id, edit).await
    }

    async fn delete(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        self.storage.delete(id).await
    }

    async fn delete_by_project(&self, project: &ProjectId) -> Result<Vec<Task>, DomainError> {
        let tasks = self
            .storage
            .find(&|t: &Task| t.project() == project)
            .await?;

        let mut deleted = Vec::with_capacity(tasks.len());

        for task in tasks {
            if let Some(task) = self.storage.delete(task.id()).await? {
                deleted.push(task);
            }
        }

        Ok(sort_tasks(deleted))
    }

    async fn assign(&self, id: &TaskId, users: &[UserId]) -> Result<Task, DomainError> {
        self.edit(
            id,
            Box::new(|task: &mut Task| {
                task.assign(users);
                Ok(())
            }),
        )
        .await
    }

    async fn unassign(&self, id: &TaskId, user: &UserId) -> Result<Task, DomainError> {
        self.edit(
            id,
            Box::new(|task: &mut Task| {
                task.unassign(user);
                Ok(())
            }),
        )
        .await
    }
}
