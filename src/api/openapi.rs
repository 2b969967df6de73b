//! OpenAPI document served at `/openapi.json` and browsed at `/api-docs`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::{health, projects, tasks, users};
use crate::api::types::ApiErrorResponse;
use crate::domain::project::{Project, ProjectId};
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::domain::user::UserId;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task Manager API",
        description = "Users, projects and tasks behind JWT authentication"
    ),
    tags(
        (name = "Users", description = "Registration, login and profile"),
        (name = "Projects", description = "Projects and their members"),
        (name = "Tasks", description = "Tasks, assignment and search"),
        (name = "Health", description = "Liveness and readiness")
    ),
    paths(
        users::register,
        users::login,
        users::profile,
        users::logout,
        users::list_users,
        projects::create_project,
        projects::list_my_projects,
        projects::list_all_projects,
        projects::get_project,
        projects::update_project,
        projects::delete_project,
        projects::add_member,
        projects::remove_member,
        tasks::create_task,
        tasks::list_my_tasks,
        tasks::list_all_tasks,
        tasks::search_tasks,
        tasks::list_project_tasks,
        tasks::list_tasks_by_status,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::assign_task,
        tasks::unassign_task,
        health::health_check,
        health::ready_check,
        health::live_check,
    ),
    components(schemas(
        ApiErrorResponse,
        UserId,
        ProjectId,
        TaskId,
        TaskStatus,
        Project,
        Task,
        users::RegisterApiRequest,
        users::LoginApiRequest,
        users::UserResponse,
        users::AuthResponse,
        users::ProfileResponse,
        users::MessageResponse,
        projects::CreateProjectApiRequest,
        projects::UpdateProjectApiRequest,
        projects::MemberApiRequest,
        projects::ProjectEnvelope,
        tasks::Assignees,
        tasks::CreateTaskApiRequest,
        tasks::UpdateTaskApiRequest,
        tasks::AssignApiRequest,
        tasks::UnassignApiRequest,
        tasks::TaskEnvelope,
        health::HealthResponse,
        health::HealthStatus,
        health::HealthCheck,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
