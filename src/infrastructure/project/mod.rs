//! Project infrastructure: storage-backed repository and cached service

mod repository;
mod service;

pub use repository::StorageProjectRepository;
pub use service::{CreateProjectRequest, ProjectService, UpdateProjectRequest};
