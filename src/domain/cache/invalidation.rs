//! Write-path invalidation table
//!
//! Maps every mutation to the complete set of cached queries whose result
//! it can change. Services consult this table before writing to the store.

use crate::domain::project::Project;
use crate::domain::task::Task;
use crate::domain::user::{User, UserId};

use super::key::{CacheKey, KeyFamily};

/// A store write, described by the entity state needed to compute its fan-out
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    UserRegistered {
        user: &'a User,
    },
    ProjectCreated {
        project: &'a Project,
    },
    ProjectUpdated {
        before: &'a Project,
        after: &'a Project,
    },
    /// A member was added to or removed from the project
    ProjectMembershipChanged {
        project: &'a Project,
        member: &'a UserId,
    },
    /// Project removal together with its cascaded tasks
    ProjectDeleted {
        project: &'a Project,
        tasks: &'a [Task],
    },
    TaskCreated {
        task: &'a Task,
    },
    TaskUpdated {
        before: &'a Task,
        after: &'a Task,
    },
    /// Users were assigned to or unassigned from the task
    TaskAssignmentChanged {
        task: &'a Task,
        users: &'a [UserId],
    },
    TaskDeleted {
        task: &'a Task,
    },
}

/// One entry of a fan-out: a single key or a whole family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    Key(CacheKey),
    Family(KeyFamily),
}

impl Mutation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::ProjectCreated { .. } => "project_created",
            Self::ProjectUpdated { .. } => "project_updated",
            Self::ProjectMembershipChanged { .. } => "project_membership_changed",
            Self::ProjectDeleted { .. } => "project_deleted",
            Self::TaskCreated { .. } => "task_created",
            Self::TaskUpdated { .. } => "task_updated",
            Self::TaskAssignmentChanged { .. } => "task_assignment_changed",
            Self::TaskDeleted { .. } => "task_deleted",
        }
    }

    /// Every key or family this mutation makes stale, without duplicates
    pub fn invalidations(&self) -> Vec<Invalidation> {
        let mut fan_out = FanOut::default();

        match *self {
            Self::UserRegistered { user } => {
                fan_out.key(CacheKey::AllUsers);
                fan_out.key(CacheKey::User(user.id().clone()));
            }
            Self::ProjectCreated { project } => {
                fan_out.key(CacheKey::AllProjects);
                fan_out.key(CacheKey::ProjectsByUser(project.owner().clone()));
            }
            Self::ProjectUpdated { before, after } => {
                fan_out.project(before);
                fan_out.project(after);
            }
            Self::ProjectMembershipChanged { project, member } => {
                fan_out.project(project);
                fan_out.key(CacheKey::ProjectsByUser(member.clone()));
            }
            Self::ProjectDeleted { project, tasks } => {
                fan_out.project(project);
                fan_out.key(CacheKey::AllTasks);
                fan_out.key(CacheKey::TasksByProject(project.id().clone()));

                for task in tasks {
                    fan_out.task(task);
                }
            }
            Self::TaskCreated { task } => {
                fan_out.task_queries(task);
            }
            Self::TaskUpdated { before, after } => {
                fan_out.task(before);
                fan_out.task(after);
            }
            Self::TaskAssignmentChanged { task, users } => {
                fan_out.task(task);

                for user in users {
                    fan_out.key(CacheKey::TasksByUser(user.clone()));
                }
            }
            Self::TaskDeleted { task } => {
                fan_out.task(task);
            }
        }

        fan_out.entries
    }
}

#[derive(Default)]
struct FanOut {
    entries: Vec<Invalidation>,
}

impl FanOut {
    fn push(&mut self, entry: Invalidation) {
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    fn key(&mut self, key: CacheKey) {
        self.push(Invalidation::Key(key));
    }

    fn project(&mut self, project: &Project) {
        self.key(CacheKey::AllProjects);
        self.key(CacheKey::Project(project.id().clone()));

        for user in project.participants() {
            self.key(CacheKey::ProjectsByUser(user.clone()));
        }
    }

    /// Queries a task can appear in, excluding its by-id entry
    fn task_queries(&mut self, task: &Task) {
        self.key(CacheKey::AllTasks);
        self.key(CacheKey::TasksByProject(task.project().clone()));
        self.key(CacheKey::TasksByStatus(task.status()));

        for user in task.assigned_to() {
            self.key(CacheKey::TasksByUser(user.clone()));
        }

        self.push(Invalidation::Family(KeyFamily::TasksSearch));
    }

    fn task(&mut self, task: &Task) {
        self.key(CacheKey::Task(task.id().clone()));
        self.task_queries(task);
    }
}
