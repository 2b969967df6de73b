//! Shared API types: error body and JSON extractors

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorResponse};
pub use json::{Json, ValidatedJson};
