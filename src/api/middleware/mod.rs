//! API middleware components

pub mod logging;
pub mod rate_limit;
pub mod security;
pub mod user_auth;

pub use logging::logging_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
pub use security::security_headers_middleware;
pub use user_auth::RequireUser;
