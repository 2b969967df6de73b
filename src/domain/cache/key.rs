//! Cache key namespace
//!
//! One variant per query family. The string form is the key stored in the
//! cache; families with an unbounded key space also expose a wildcard
//! pattern so they can be dropped in one call.

use std::fmt;

use crate::domain::project::ProjectId;
use crate::domain::task::{TaskId, TaskStatus};
use crate::domain::user::UserId;

/// Canonical key of one cached query result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllUsers,
    User(UserId),
    AllProjects,
    Project(ProjectId),
    ProjectsByUser(UserId),
    AllTasks,
    Task(TaskId),
    TasksByProject(ProjectId),
    TasksByUser(UserId),
    TasksByStatus(TaskStatus),
    /// Search results, keyed by the lower-cased term
    TasksSearch(String),
}

impl CacheKey {
    /// Builds a search key, normalizing the term the same way the query does
    pub fn tasks_search(term: &str) -> Self {
        Self::TasksSearch(normalize_search_term(term))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllUsers => write!(f, "allUsers"),
            Self::User(id) => write!(f, "user:{}", id),
            Self::AllProjects => write!(f, "allProjects"),
            Self::Project(id) => write!(f, "project:{}", id),
            Self::ProjectsByUser(id) => write!(f, "projectsByUser:{}", id),
            Self::AllTasks => write!(f, "allTasks"),
            Self::Task(id) => write!(f, "task:{}", id),
            Self::TasksByProject(id) => write!(f, "tasksByProject:{}", id),
            Self::TasksByUser(id) => write!(f, "tasksByUser:{}", id),
            Self::TasksByStatus(status) => write!(f, "tasksByStatus:{}", status),
            Self::TasksSearch(term) => write!(f, "tasksSearch:{}", term),
        }
    }
}

/// Key families whose members can be removed by pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    TasksSearch,
}

impl KeyFamily {
    /// Wildcard pattern understood by [`super::Cache::delete_pattern`]
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::TasksSearch => "tasksSearch:*",
        }
    }
}

pub fn normalize_search_term(term: &str) -> String {
    term.to_lowercase()
}
