//! Project endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use tracing::debug;
use validator::Validate;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiErrorResponse, Json, ValidatedJson};
use crate::domain::project::{Project, ProjectId};
use crate::domain::user::UserId;
use crate::infrastructure::project::{CreateProjectRequest, UpdateProjectRequest};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProjectApiRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectApiRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberApiRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectEnvelope {
    pub message: String,
    pub project: Project,
}

impl ProjectEnvelope {
    fn new(message: &str, project: Project) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            project,
        })
    }
}

pub fn create_projects_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project).get(list_my_projects))
        .route("/all", get(list_all_projects))
        .route(
            "/{project_id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/{project_id}/members", post(add_member))
        .route("/{project_id}/members/{user_id}", delete(remove_member))
}

/// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectApiRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectEnvelope),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_project(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ValidatedJson(request): ValidatedJson<CreateProjectApiRequest>,
) -> Result<(StatusCode, Json<ProjectEnvelope>), ApiError> {
    debug!(owner = %user.id(), name = %request.name, "Creating project");

    let project = state
        .project_service
        .create(
            CreateProjectRequest {
                name: request.name,
                description: request.description,
            },
            user.id().clone(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ProjectEnvelope::new("Project created successfully", project),
    ))
}

/// GET /api/projects/all
#[utoipa::path(
    get,
    path = "/api/projects/all",
    tag = "Projects",
    responses(
        (status = 200, description = "Every project", body = Vec<Project>),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_all_projects(
    State(state): State<AppState>,
    _user: RequireUser,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.project_service.list_all().await?))
}

/// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Projects the caller owns or belongs to", body = Vec<Project>),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_my_projects(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.project_service.list_for_user(user.id()).await?))
}

/// GET /api/projects/{project_id}
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project id"),
    ),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "Project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_project(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let id = ProjectId::parse(&project_id)?;

    Ok(Json(state.project_service.get_required(&id).await?))
}

/// PUT /api/projects/{project_id}
#[utoipa::path(
    put,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project id"),
    ),
    request_body = UpdateProjectApiRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectEnvelope),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 404, description = "Project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_project(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(project_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateProjectApiRequest>,
) -> Result<Json<ProjectEnvelope>, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    debug!(project_id = %id, "Updating project");

    let project = state
        .project_service
        .update(
            &id,
            UpdateProjectRequest {
                name: request.name,
                description: request.description,
            },
        )
        .await?;

    Ok(ProjectEnvelope::new("Project updated successfully", project))
}

/// DELETE /api/projects/{project_id}
///
/// Removes the project's tasks too and returns the deleted project.
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project id"),
    ),
    responses(
        (status = 200, description = "Deleted project, its tasks removed", body = Project),
        (status = 404, description = "Project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_project(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    debug!(project_id = %id, "Deleting project");

    Ok(Json(state.project_service.delete(&id).await?))
}

/// POST /api/projects/{project_id}/members
#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/members",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project id"),
    ),
    request_body = MemberApiRequest,
    responses(
        (status = 200, description = "Member added", body = ProjectEnvelope),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "Project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn add_member(
    State(state): State<AppState>,
    _user: RequireUser,
    Path(project_id): Path<String>,
    Json(request): Json<MemberApiRequest>,
) -> Result<Json<ProjectEnvelope>, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    let member = UserId::parse(&request.user_id)?;

    let project = state.project_service.add_member(&id, &member).await?;

    Ok(ProjectEnvelope::new("Member added successfully", project))
}

/// DELETE /api/projects/{project_id}/members/{user_id}
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/members/{user_id}",
    tag = "Projects",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("user_id" = String, Path, description = "Member user id"),
    ),
    responses(
        (status = 200, description = "Member removed", body = ProjectEnvelope),
        (status = 400, description = "Malformed id", body = ApiErrorResponse),
        (status = 404, description = "Project not found", body = ApiErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn remove_member(
    State(state): State<AppState>,
    _user: RequireUser,
    Path((project_id, user_id)): Path<(String, String)>,
) -> Result<Json<ProjectEnvelope>, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    let member = UserId::parse(&user_id)?;

    let project = state.project_service.remove_member(&id, &member).await?;

    Ok(ProjectEnvelope::new("Member removed successfully", project))
}
