//! Application state for shared services

use std::sync::Arc;

use super::middleware::RateLimitState;
use crate::domain::cache::Cache;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::project::ProjectService;
use crate::infrastructure::storage::Stores;
use crate::infrastructure::task::TaskService;
use crate::infrastructure::user::UserService;

/// Services shared by every handler; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub project_service: Arc<ProjectService>,
    pub task_service: Arc<TaskService>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    pub rate_limit: RateLimitState,
    /// Raw stores and cache, used by readiness probes
    pub stores: Stores,
    pub cache: Arc<dyn Cache>,
}
