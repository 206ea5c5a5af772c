//! User service for signup, login and profile lookup

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{
    validate_email, validate_password_confirmation, validate_username, User, UserId,
    UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// User service for account management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user
    pub async fn signup(&self, request: SignupRequest) -> Result<User, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password_confirmation(&request.password, &request.password_confirmation)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(&request.username).await?
            || self.repository.email_exists(&request.email).await?
        {
            return Err(DomainError::conflict("User already registered"));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = User::new(
            UserId::generate(),
            request.username,
            request.email,
            password_hash,
        );

        let user = self.repository.create(user).await?;
        info!(user_id = %user.id(), username = %user.username(), "User registered");

        Ok(user)
    }

    /// Authenticate a user with username and password
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.repository.get_by_username(username).await? else {
            debug!(username = %username, "Login rejected: unknown username");
            return Ok(None);
        };

        if !self.hasher.matches(password, user.password_hash()) {
            debug!(user_id = %user.id(), "Login rejected: wrong password");
            return Ok(None);
        }

        self.repository.record_login(user.id()).await?;

        // Re-fetch user to get updated last_login_at
        self.repository.get(user.id()).await
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }

    /// Get a user by username, failing when absent
    pub async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("siteuser not found"))
    }

    /// Count registered users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
