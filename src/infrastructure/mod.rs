//! Infrastructure layer - storage, cache, auth and service implementations

pub mod auth;
pub mod cache;
pub mod logging;
pub mod project;
pub mod storage;
pub mod task;
pub mod user;
