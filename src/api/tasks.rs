//! Task endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use tracing::debug;
use validator::Validate;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiErrorResponse, Json, ValidatedJson};
use crate::api::users::MessageResponse;
use crate::domain::project::ProjectId;
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::task::{CreateTaskRequest, UpdateTaskRequest};

/// `assignedTo` accepts a single user id or a list of them
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Assignees {
    One(String),
    Many(Vec<String>),
}

impl Assignees {
    fn parse(self) -> Result<Vec<UserId>, DomainError> {
        match self {
            Self::One(id) => Ok(vec![UserId::parse(&id)?]),
            Self::Many(ids) => parse_user_ids(&ids),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskApiRequest {
    #[validate(length(min = 3, max = 100, message = "Task title must be between 3 and 100 characters"))]
    pub title: String,
    #[validate(length(max = 500, message = "Description cannot be longer than 500 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Project ID is required"))]
    pub project: String,
    pub assigned_to: Option<Assignees>,
    pub due_date: Option<String>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskApiRequest {
    #[validate(length(min = 3, max = 100, message = "Task title must be between 3 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "Description cannot be longer than 500 characters"))]
    pub description: Option<String>,
    pub project: Option<String>,
    pub assigned_to: Option<Assignees>,
    pub due_date: Option<String>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignApiRequest {
    #[validate(length(min = 1, message = "At least one user ID must be provided"))]
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnassignApiRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskEnvelope {
    pub message: String,
    pub task: Task,
}

impl TaskEnvelope {
    fn new(message: &str, task: Task) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            task,
        })
    }
}

pub fn create_tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_task).get(list_my_tasks))
        .route("/all", get(list_all_tasks))
        .route("/search", get(search_tasks))
        .route("/project/{project_id}", get(list_project_tasks))
        .route("/status/{status}", get(list_tasks_by_status))
        .route(
            "/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/{task_id}/assign", post(assign_task))
        .route("/{task_id}/unassign", post(unassign_task))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
fn parse_due_date(value: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| DomainError::validation("Due date must be a valid date"))
}

fn parse_user_ids(ids: &[String]) -> Result<Vec<UserId>, DomainError> {
    ids.iter().map(|id| UserId::parse(id)).collect()
}

/// POST /api/tasks
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = CreateTaskApiRequest,
    responses(
        (status = 201, description = "Task created", body = TaskEnvelope),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 404, description = "Project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ValidatedJson(request): ValidatedJson<CreateTaskApiRequest>,
) -> Result<(StatusCode, Json<TaskEnvelope>), ApiError> {
    debug!(user_id = %user.id(), title = %request.title, "Creating task");

    let task = state
        .task_service
        .create(CreateTaskRequest {
            title: request.title,
            description: request.description,
            project: ProjectId::parse(&request.project)?,
            assigned_to: match request.assigned_to {
                Some(assignees) => assignees.parse()?,
                None => Vec::new(),
            },
            due_date: request.due_date.as_deref().map(parse_due_date).transpose()?,
            status: request.status,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        TaskEnvelope::new("Task created successfully", task),
    ))
}

/// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    responses(
        (status = 200, description = "Tasks assigned to the caller", body = Vec<Task>),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_my_tasks(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.task_service.list_for_user(user.id()).await?))
}

/// GET /api/tasks/all
#[utoipa::path(
    get,
    path = "/api/tasks/all",
    tag = "Tasks",
    responses(
        (status = 200, description = "Every task", body = Vec<Task>),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_all_tasks(
    State(state): State<AppState>,
    _user: RequireUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.task_service.list_all().await?))
}

/// GET /api/tasks/project/{project_id}
#[utoipa::path(
    get,
    path = "/api/tasks/project/{project_id}",
    tag = "Tasks",
    params(
        ("project_id" = String, Path, description = "Project id"),
    ),
    responses(
        (status = 200, description = "Tasks of the project", body = Vec<Task>),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_project_tasks(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let project = ProjectId::parse(&project_id)?;

    Ok(Json(state.task_service.list_by_project(&project).await?))
}

/// GET /api/tasks/search?searchTerm=
#[utoipa::path(
    get,
    path = "/api/tasks/search",
    tag = "Tasks",
    params(
        SearchParams,
    ),
    responses(
        (status = 200, description = "Tasks whose title or description contains the term", body = Vec<Task>),
        (status = 400, description = "Missing search term", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn search_tasks(
    State(state): State<AppState>,
    _user: RequireUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let term = params.search_term.unwrap_or_default();
    debug!(term = %term, "Searching tasks");

    Ok(Json(state.task_service.search(&term).await?))
}

/// GET /api/tasks/status/{status}
#[utoipa::path(
    get,
    path = "/api/tasks/status/{status}",
    tag = "Tasks",
    params(
        ("status" = TaskStatus, Path, description = "Task status"),
    ),
    responses(
        (status = 200, description = "Tasks with the status", body = Vec<Task>),
        (status = 400, description = "Unknown status", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_tasks_by_status(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(status): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let status: TaskStatus = status.parse()?;

    Ok(Json(state.task_service.list_by_status(status).await?))
}

/// GET /api/tasks/{task_id}
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task id"),
    ),
    responses(
        (status = 200, description = "Task", body = Task),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "Task not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_task(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = TaskId::parse(&task_id)?;

    Ok(Json(state.task_service.get_required(&id).await?))
}

/// PUT /api/tasks/{task_id}
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task id"),
    ),
    request_body = UpdateTaskApiRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskEnvelope),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 404, description = "Task or project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_task(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(task_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTaskApiRequest>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = TaskId::parse(&task_id)?;
    debug!(task_id = %id, "Updating task");

    let update = UpdateTaskRequest {
        title: request.title,
        description: request.description,
        status: request.status,
        project: request
            .project
            .as_deref()
            .map(ProjectId::parse)
            .transpose()?,
        assigned_to: request.assigned_to.map(Assignees::parse).transpose()?,
        due_date: request.due_date.as_deref().map(parse_due_date).transpose()?,
    };

    let task = state.task_service.update(&id, update).await?;

    Ok(TaskEnvelope::new("Task updated successfully", task))
}

/// DELETE /api/tasks/{task_id}
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task id"),
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_task(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = TaskId::parse(&task_id)?;

    state.task_service.delete(&id).await?;

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// POST /api/tasks/{task_id}/assign
#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/assign",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task id"),
    ),
    request_body = AssignApiRequest,
    responses(
        (status = 200, description = "Users assigned", body = TaskEnvelope),
        (status = 400, description = "Invalid user ids", body = ApiErrorResponse),
        (status = 404, description = "Task not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn assign_task(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(task_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AssignApiRequest>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = TaskId::parse(&task_id)?;
    let users = parse_user_ids(&request.user_ids)?;

    let task = state.task_service.assign(&id, &users).await?;

    Ok(TaskEnvelope::new("Users assigned successfully", task))
}

/// POST /api/tasks/{task_id}/unassign
#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/unassign",
    tag = "Tasks",
    params(
        ("task_id" = String, Path, description = "Task id"),
    ),
    request_body = UnassignApiRequest,
    responses(
        (status = 200, description = "User unassigned", body = TaskEnvelope),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "Task not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn unassign_task(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(task_id): Path<String>,
    Json(request): Json<UnassignApiRequest>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = TaskId::parse(&task_id)?;
    let user = UserId::parse(&request.user_id)?;

    let task = state.task_service.unassign(&id, &user).await?;

    Ok(TaskEnvelope::new("User unassigned successfully", task))
}
