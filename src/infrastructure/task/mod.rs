//! Task infrastructure: storage-backed repository and cached service

mod repository;
mod service;

pub use repository::StorageTaskRepository;
pub use service::{CreateTaskRequest, TaskService, UpdateTaskRequest};
