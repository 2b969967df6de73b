//! User service for registration, login and cached user reads

use std::sync::Arc;

use tracing::info;

use crate::domain::cache::{CacheKey, Mutation};
use crate::domain::user::{validate_username, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::cache::ReadThroughCache;

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// User service for authentication and user reads
#[derive(Debug)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    cache: ReadThroughCache,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        cache: ReadThroughCache,
    ) -> Self {
        Self {
            repository,
            hasher,
            cache,
        }
    }

    /// Register a new user; username and email must both be unused
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;

        let email = request.email.trim().to_lowercase();

        if self.repository.username_exists(&request.username).await? {
            return Err(DomainError::conflict("Username already exists"));
        }

        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict("Email already exists"));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(&request.username, email, password_hash);

        self.cache
            .invalidate(&Mutation::UserRegistered { user: &user })
            .await;

        let user = self.repository.create(user).await?;

        self.cache
            .invalidate(&Mutation::UserRegistered { user: &user })
            .await;

        info!(user_id = %user.id(), username = %user.username(), "User registered");

        Ok(user)
    }

    /// Check credentials; any mismatch is reported as the same error
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let invalid = || DomainError::unauthorized("Invalid credentials");

        let user = self
            .repository
            .get_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify(password, user.password_hash()) {
            return Err(invalid());
        }

        Ok(user)
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load_optional(CacheKey::User(id.clone()), || repository.get(id))
            .await
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        let repository = &self.repository;

        self.cache
            .get_or_load(CacheKey::AllUsers, || repository.list())
            .await
    }
}
