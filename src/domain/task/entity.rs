//! Task entity and status

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::id::uuid_id;
use crate::domain::project::ProjectId;
use crate::domain::storage::StorageEntity;
use crate::domain::user::UserId;
use crate::domain::DomainError;

uuid_id!(
    /// Task identifier
    TaskId,
    "task"
);

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::validation(format!(
                "Invalid status '{}'. Expected one of: pending, in_progress, completed",
                other
            ))),
        }
    }
}

/// A unit of work inside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    status: TaskStatus,
    project: ProjectId,
    #[serde(default)]
    assigned_to: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task with no assignees
    pub fn new(title: impl Into<String>, project: ProjectId) -> Self {
        let now = Utc::now();

        Self {
            id: TaskId::generate(),
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            project,
            assigned_to: Vec::new(),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_assignees(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        for user in users {
            if !self.assigned_to.contains(&user) {
                self.assigned_to.push(user);
            }
        }
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn assigned_to(&self) -> &[UserId] {
        &self.assigned_to
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_to.contains(user)
    }

    /// Case-insensitive substring match on title or description.
    /// `term` must already be lower-cased.
    pub fn matches_term(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(term))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.touch();
    }

    pub fn set_project(&mut self, project: ProjectId) {
        self.project = project;
        self.touch();
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
        self.touch();
    }

    /// Replaces the assignee set, dropping duplicates
    pub fn set_assignees(&mut self, users: impl IntoIterator<Item = UserId>) {
        self.assigned_to.clear();

        for user in users {
            if !self.assigned_to.contains(&user) {
                self.assigned_to.push(user);
            }
        }
        self.touch();
    }

    /// Adds assignees with set semantics; returns how many were new
    pub fn assign<'a>(&mut self, users: impl IntoIterator<Item = &'a UserId>) -> usize {
        let mut added = 0;

        for user in users {
            if !self.assigned_to.contains(user) {
                self.assigned_to.push(user.clone());
                added += 1;
            }
        }

        if added > 0 {
            self.touch();
        }
        added
    }

    /// Removes an assignee; returns false when not assigned
    pub fn unassign(&mut self, user: &UserId) -> bool {
        let before = self.assigned_to.len();
        self.assigned_to.retain(|u| u != user);

        if self.assigned_to.len() == before {
            return false;
        }

        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Task {
    type Key = TaskId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
