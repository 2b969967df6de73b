//! Task service - CRUD, assignment and cached queries for tasks

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::cache::{normalize_search_term, CacheKey, Mutation};
use crate::domain::project::{ProjectId, ProjectRepository};
use crate::domain::task::{Task, TaskId, TaskRepository, TaskStatus};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::cache::ReadThroughCache;

/// Request to create a new task
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub project: ProjectId,
    pub assigned_to: Vec<UserId>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
}

/// Request to update an existing task; unset fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub project: Option<ProjectId>,
    pub assigned_to: Option<Vec<UserId>>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    fn apply(self, task: &mut Task) {
        if let Some(project) = self.project {
            task.set_project(project);
        }

        if let Some(title) = self.title {
            task.set_title(title);
        }

        if self.description.is_some() {
            task.set_description(self.description);
        }

        if let Some(status) = self.status {
            task.set_status(status);
        }

        if let Some(users) = self.assigned_to {
            task.set_assignees(users);
        }

        if self.due_date.is_some() {
            task.set_due_date(self.due_date);
        }
    }
}

/// Task service with read-through caching
///
/// Every write invalidates its fan-out before the store write and again
/// after it succeeds.
#[derive(Debug)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    cache: ReadThroughCache,
}

impl TaskService {
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        cache: ReadThroughCache,
    ) -> Self {
        Self {
            repository,
            projects,
            cache,
        }
    }

    /// Create a task inside an existing project
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, DomainError> {
        self.ensure_project(&request.project).await?;

        let task = Task::new(request.title, request.project)
            .with_description(request.description)
            .with_status(request.status.unwrap_or_default())
            .with_due_date(request.due_date)
            .with_assignees(request.assigned_to);

        self.cache
            .invalidate(&Mutation::TaskCreated { task: &task })
            .await;

        let task = self.repository.create(task).await?;

        self.cache
            .invalidate(&Mutation::TaskCreated { task: &task })
            .await;

        info!(task_id = %task.id(), project_id = %task.project(), "Task created");

        Ok(task)
    }

    pub async fn get(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load_optional(CacheKey::Task(id.clone()), || repository.get(id))
            .await
    }

    /// Get a task, returning an error if not found
    pub async fn get_required(&self, id: &TaskId) -> Result<Task, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Task not found"))
    }

    pub async fn list_all(&self) -> Result<Vec<Task>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::AllTasks, || repository.list())
            .await
    }

    pub async fn list_by_project(&self, project: &ProjectId) -> Result<Vec<Task>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::TasksByProject(project.clone()), || {
                repository.list_by_project(project)
            })
            .await
    }

    /// Tasks the user is assigned to
    pub async fn list_for_user(&self, user: &UserId) -> Result<Vec<Task>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::TasksByUser(user.clone()), || {
                repository.list_by_user(user)
            })
            .await
    }

    pub async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::TasksByStatus(status), || {
                repository.list_by_status(status)
            })
            .await
    }

    /// Case-insensitive substring search over title and description
    pub async fn search(&self, term: &str) -> Result<Vec<Task>, DomainError> {
        let term = normalize_search_term(term);

        if term.is_empty() {
            return Err(DomainError::validation(
                "searchTerm query parameter is required and must be a string",
            ));
        }

        let repository = &self.repository;
        let key = CacheKey::tasks_search(&term);

        self.cache
            .get_or_load(key, || repository.search(&term))
            .await
    }

    pub async fn update(&self, id: &TaskId, request: UpdateTaskRequest) -> Result<Task, DomainError> {
        let before = self.load(id).await?;

        if let Some(ref project) = request.project {
            if project != before.project() {
                self.ensure_project(project).await?;
            }
        }

        let mut planned = before.clone();
        request.clone().apply(&mut planned);

        self.cache
            .invalidate(&Mutation::TaskUpdated {
                before: &before,
                after: &planned,
            })
            .await;

        let task = self
            .repository
            .update(id, Box::new(move |task: &mut Task| {
                request.apply(task);
                Ok(())
            }))
            .await?;

        self.cache
            .invalidate(&Mutation::TaskUpdated {
                before: &before,
                after: &task,
            })
            .await;

        info!(task_id = %task.id(), status = %task.status(), "Task updated");

        Ok(task)
    }

    pub async fn delete(&self, id: &TaskId) -> Result<Task, DomainError> {
        let task = self.load(id).await?;

        self.cache
            .invalidate(&Mutation::TaskDeleted { task: &task })
            .await;

        let task = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Task not found"))?;

        self.cache
            .invalidate(&Mutation::TaskDeleted { task: &task })
            .await;

        info!(task_id = %task.id(), "Task deleted");

        Ok(task)
    }

    /// Add users to the task's assignees; already assigned users are skipped
    pub async fn assign(&self, id: &TaskId, users: &[UserId]) -> Result<Task, DomainError> {
        if users.is_empty() {
            return Err(DomainError::validation("User IDs must be a non-empty array"));
        }

        let task = self.load(id).await?;

        self.cache
            .invalidate(&Mutation::TaskAssignmentChanged { task: &task, users })
            .await;

        let task = self.repository.assign(id, users).await?;

        self.cache
            .invalidate(&Mutation::TaskAssignmentChanged { task: &task, users })
            .await;

        info!(task_id = %task.id(), assigned = users.len(), "Users assigned to task");

        Ok(task)
    }

    pub async fn unassign(&self, id: &TaskId, user: &UserId) -> Result<Task, DomainError> {
        let task = self.load(id).await?;

        self.cache
            .invalidate(&Mutation::TaskAssignmentChanged {
                task: &task,
                users: std::slice::from_ref(user),
            })
            .await;

        let task = self.repository.unassign(id, user).await?;

        self.cache
            .invalidate(&Mutation::TaskAssignmentChanged {
                task: &task,
                users: std::slice::from_ref(user),
            })
            .await;

        info!(task_id = %task.id(), user_id = %user, "User unassigned from task");

        Ok(task)
    }

    async fn ensure_project(&self, id: &ProjectId) -> Result<(), DomainError> {
        match self.projects.get(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Project not found")),
        }
    }

    async fn load(&self, id: &TaskId) -> Result<Task, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Task not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::cache::Cache;
    use crate::domain::project::Project;
    use crate::domain::storage::mock::MockStorage;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::project::StorageProjectRepository;
    use crate::infrastructure::task::StorageTaskRepository;

    struct Fixture {
        storage: Arc<MockStorage<Task>>,
        cache: Arc<InMemoryCache>,
        service: TaskService,
        project: Project,
    }

    fn fixture() -> Fixture {
        fixture_with(MockStorage::new())
    }

    fn fixture_with(storage: MockStorage<Task>) -> Fixture {
        let project = Project::new("Launch", None, UserId::generate());
        let projects = MockStorage::<Project>::new().with_entity(project.clone());
        let storage = Arc::new(storage);
        let cache = Arc::new(InMemoryCache::new());

        let service = TaskService::new(
            Arc::new(StorageTaskRepository::new(storage.clone())),
            Arc::new(StorageProjectRepository::new(Arc::new(projects))),
            ReadThroughCache::new(cache.clone()),
        );

        Fixture {
            storage,
            cache,
            service,
            project,
        }
    }

    fn request(title: &str, project: &Project) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: None,
            project: project.id().clone(),
            assigned_to: Vec::new(),
            due_date: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_project() {
        let f = fixture();
        let orphan = Project::new("Ghost", None, UserId::generate());

        let result = f.service.create(request("Write docs", &orphan)).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.assigned_to().is_empty());
    }

    #[tokio::test]
    async fn test_second_list_is_served_from_cache() {
        let f = fixture();
        f.service.create(request("Write docs", &f.project)).await.unwrap();

        let first = f.service.list_all().await.unwrap();
        let reads = f.storage.reads();
        let second = f.service.list_all().await.unwrap();

        assert_eq!(f.storage.reads(), reads);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id(), second[0].id());
    }

    #[tokio::test]
    async fn test_update_never_serves_pre_patch_value() {
        let f = fixture();
        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();

        // warm every cached query that holds the task
        f.service.get(task.id()).await.unwrap();
        f.service.list_all().await.unwrap();
        f.service.list_by_project(f.project.id()).await.unwrap();
        f.service.list_by_status(TaskStatus::Pending).await.unwrap();
        f.service.search("docs").await.unwrap();

        f.service
            .update(
                task.id(),
                UpdateTaskRequest {
                    title: Some("Write guides".to_string()),
                    status: Some(TaskStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let by_id = f.service.get_required(task.id()).await.unwrap();
        assert_eq!(by_id.title(), "Write guides");
        assert_eq!(f.service.list_all().await.unwrap()[0].title(), "Write guides");
        assert_eq!(
            f.service.list_by_project(f.project.id()).await.unwrap()[0].status(),
            TaskStatus::InProgress
        );
        assert!(f
            .service
            .list_by_status(TaskStatus::Pending)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            f.service
                .list_by_status(TaskStatus::InProgress)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(f.service.search("docs").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assign_and_unassign_refresh_user_listings() {
        let f = fixture();
        let u2 = UserId::generate();
        let u3 = UserId::generate();
        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();

        assert!(f.service.list_for_user(&u2).await.unwrap().is_empty());

        f.service
            .assign(task.id(), &[u2.clone(), u3.clone()])
            .await
            .unwrap();
        let assigned = f.service.get_required(task.id()).await.unwrap();
        assert_eq!(assigned.assigned_to(), &[u2.clone(), u3.clone()]);
        assert_eq!(f.service.list_for_user(&u2).await.unwrap().len(), 1);

        f.service.unassign(task.id(), &u2).await.unwrap();
        let unassigned = f.service.get_required(task.id()).await.unwrap();
        assert_eq!(unassigned.assigned_to(), &[u3.clone()]);
        assert!(f.service.list_for_user(&u2).await.unwrap().is_empty());
        assert_eq!(f.service.list_for_user(&u3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_rejects_empty_user_list() {
        let f = fixture();
        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();

        let result = f.service.assign(task.id(), &[]).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description() {
        let f = fixture();
        f.service.create(request("Write TESTS", &f.project)).await.unwrap();
        f.service
            .create(CreateTaskRequest {
                description: Some("add a test harness".to_string()),
                ..request("Refactor", &f.project)
            })
            .await
            .unwrap();
        f.service.create(request("Deploy", &f.project)).await.unwrap();

        let found = f.service.search("test").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.title() != "Deploy"));

        // same normalized key for differently cased terms
        let reads = f.storage.reads();
        assert_eq!(f.service.search("TEST").await.unwrap().len(), 2);
        assert_eq!(f.storage.reads(), reads);

        assert!(matches!(
            f.service.search("").await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_task_from_every_query() {
        let f = fixture();
        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();
        f.service.get(task.id()).await.unwrap();
        f.service.list_all().await.unwrap();

        let deleted = f.service.delete(task.id()).await.unwrap();
        assert_eq!(deleted.id(), task.id());

        assert!(f.service.get(task.id()).await.unwrap().is_none());
        assert!(f.service.list_all().await.unwrap().is_empty());
        assert!(matches!(
            f.service.delete(task.id()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_failure_after_invalidation_leaves_cold_cache() {
        let f = fixture();
        f.service.create(request("Write docs", &f.project)).await.unwrap();
        f.service.list_all().await.unwrap();
        assert!(f.cache.get_raw("allTasks").await.unwrap().is_some());

        f.storage.set_failing(true);
        let result = f.service.create(request("Deploy", &f.project)).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert!(f.cache.get_raw("allTasks").await.unwrap().is_none());

        f.storage.set_failing(false);
        assert_eq!(f.service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_during_slow_update_does_not_pin_old_value() {
        let f = fixture_with(MockStorage::new().with_write_delay(Duration::from_millis(50)));
        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();
        f.service.get(task.id()).await.unwrap();
        f.service.list_all().await.unwrap();

        let (updated, during) = tokio::join!(
            f.service.update(
                task.id(),
                UpdateTaskRequest {
                    title: Some("Write guides".to_string()),
                    ..Default::default()
                },
            ),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                f.service.get_required(task.id()).await
            }
        );

        assert_eq!(updated.unwrap().title(), "Write guides");
        assert_eq!(during.unwrap().title(), "Write docs");

        assert_eq!(
            f.service.get_required(task.id()).await.unwrap().title(),
            "Write guides"
        );
        assert_eq!(f.service.list_all().await.unwrap()[0].title(), "Write guides");
    }

    #[tokio::test]
    async fn test_concurrent_assignments_keep_both_users() {
        let f = fixture_with(MockStorage::new().with_write_delay(Duration::from_millis(20)));
        let u2 = UserId::generate();
        let u3 = UserId::generate();
        let task = f.service.create(request("Write docs", &f.project)).await.unwrap();

        let (first, second) = tokio::join!(
            f.service.assign(task.id(), std::slice::from_ref(&u2)),
            f.service.assign(task.id(), std::slice::from_ref(&u3)),
        );
        first.unwrap();
        second.unwrap();

        let assigned = f.service.get_required(task.id()).await.unwrap();
        assert_eq!(assigned.assigned_to().len(), 2);
        assert!(assigned.assigned_to().contains(&u2));
        assert!(assigned.assigned_to().contains(&u3));
        assert_eq!(f.service.list_for_user(&u2).await.unwrap().len(), 1);
        assert_eq!(f.service.list_for_user(&u3).await.unwrap().len(), 1);
    }
}
