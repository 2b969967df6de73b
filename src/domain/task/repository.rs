//! Task repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Task, TaskId, TaskStatus};
use crate::domain::project::ProjectId;
use crate::domain::storage::Mutator;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Combined task filter; every set field must match
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub project: Option<ProjectId>,
    pub assignee: Option<UserId>,
    pub status: Option<TaskStatus>,
    /// Lower-cased search term matched against title and description
    pub term: Option<String>,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(ref project) = self.project {
            if task.project() != project {
                return false;
            }
        }

        if let Some(ref assignee) = self.assignee {
            if !task.is_assigned_to(assignee) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if task.status() != status {
                return false;
            }
        }

        if let Some(ref term) = self.term {
            if !task.matches_term(term) {
                return false;
            }
        }

        true
    }
}

/// Repository trait for task storage
///
/// Lists are ordered by creation time and never absent.
#[async_trait]
pub trait TaskRepository: Send + Sync + Debug {
    async fn get(&self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    async fn list(&self) -> Result<Vec<Task>, DomainError>;

    async fn find(&self, query: &TaskQuery) -> Result<Vec<Task>, DomainError>;

    async fn list_by_project(&self, project: &ProjectId) -> Result<Vec<Task>, DomainError> {
        self.find(&TaskQuery {
            project: Some(project.clone()),
            ..Default::default()
        })
        .await
    }

    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Task>, DomainError> {
        self.find(&TaskQuery {
            assignee: Some(user.clone()),
            ..Default::default()
        })
        .await
    }

    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, DomainError> {
        self.find(&TaskQuery {
            status: Some(status),
            ..Default::default()
        })
        .await
    }

    async fn search(&self, term: &str) -> Result<Vec<Task>, DomainError> {
        self.find(&TaskQuery {
            term: Some(term.to_lowercase()),
            ..Default::default()
        })
        .await
    }

    async fn create(&self, task: Task) -> Result<Task, DomainError>;

    /// Apply an edit atomically; NotFound if the task does not exist
    async fn update(&self, id: &TaskId, edit: Mutator<'_, Task>) -> Result<Task, DomainError>;

    /// Delete a task, returning it if it existed
    async fn delete(&self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    /// Delete every task of a project, returning the removed tasks
    async fn delete_by_project(&self, project: &ProjectId) -> Result<Vec<Task>, DomainError>;

    /// Add assignees with set semantics
    async fn assign(&self, id: &TaskId, users: &[UserId]) -> Result<Task, DomainError>;

    /// Remove one assignee (no-op if absent)
    async fn unassign(&self, id: &TaskId, user: &UserId) -> Result<Task, DomainError>;
}
