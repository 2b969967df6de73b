//! Task domain

mod entity;
mod repository;

pub use entity::{Task, TaskId, TaskStatus};
pub use repository::{TaskQuery, TaskRepository};
