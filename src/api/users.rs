//! User endpoints: registration, login, profile

use axum::{extract::State, http::StatusCode, routing::{get, post}, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use tracing::debug;
use validator::Validate;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiErrorResponse, Json, ValidatedJson};
use crate::domain::user::{User, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::infrastructure::user::RegisterUserRequest;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterApiRequest {
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "must be between 6 and 128 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginApiRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Public view of a user; the password hash never leaves the service
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/logout", post(logout))
}

/// POST /api/users/register
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterApiRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input or duplicate user", body = ApiErrorResponse),
    ),
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterApiRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    debug!(username = %request.username, "Registering user");

    let user = state
        .user_service
        .register(RegisterUserRequest {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await?;

    let token = state.jwt_service.generate(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from(&user),
            token,
        }),
    ))
}

/// POST /api/users/login
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginApiRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 401, description = "Invalid credentials", body = ApiErrorResponse),
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginApiRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.email, &request.password)
        .await?;

    let token = state.jwt_service.generate(&user)?;
    debug!(user_id = %user.id(), "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(&user),
        token,
    }))
}

/// GET /api/users/profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn profile(RequireUser(user): RequireUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: "Profile retrieved successfully".to_string(),
        user: UserResponse::from(&user),
    })
}

/// POST /api/users/logout
///
/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/users/logout",
    tag = "Users",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn logout(RequireUser(user): RequireUser) -> Json<MessageResponse> {
    debug!(user_id = %user.id(), "User logged out");
    Json(MessageResponse::new("Logout successful"))
}

/// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Every user", body = Vec<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_users(
    State(state): State<AppState>,
    _user: RequireUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list().await?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}
