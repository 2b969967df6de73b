//! User infrastructure module
//!
//! Password hashing with Argon2, the storage-backed repository and the
//! user service used for registration and login.

mod password;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use repository::StorageUserRepository;
pub use service::{RegisterUserRequest, UserService};
