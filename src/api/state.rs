//! Application state for shared services

use std::sync::Arc;

use crate::domain::password_reset::{PasswordResetError, PasswordResetTokenRepository};
use crate::domain::user::{User, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::password_reset::PasswordResetService;
use crate::infrastructure::user::{PasswordHasher, SignupRequest, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub password_reset_service: Arc<dyn PasswordResetServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

/// Account operations used by the HTTP layer
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn signup(&self, request: SignupRequest) -> Result<User, DomainError>;
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<User>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

/// Password reset operations used by the HTTP layer
#[async_trait::async_trait]
pub trait PasswordResetServiceTrait: Send + Sync {
    async fn request_reset(&self, email: &str) -> Result<(), PasswordResetError>;
    async fn redeem(
        &self,
        token: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), PasswordResetError>;
    async fn purge_expired(&self) -> Result<usize, PasswordResetError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn signup(&self, request: SignupRequest) -> Result<User, DomainError> {
        UserService::signup(self, request).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }
}

#[async_trait::async_trait]
impl<U, T, H> PasswordResetServiceTrait for PasswordResetService<U, T, H>
where
    U: UserRepository + 'static,
    T: PasswordResetTokenRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn request_reset(&self, email: &str) -> Result<(), PasswordResetError> {
        PasswordResetService::request_reset(self, email).await
    }

    async fn redeem(
        &self,
        token: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<(), PasswordResetError> {
        PasswordResetService::redeem(self, token, new_password, confirmation).await
    }

    async fn purge_expired(&self) -> Result<usize, PasswordResetError> {
        PasswordResetService::purge_expired(self).await
    }
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        password_reset_service: Arc<dyn PasswordResetServiceTrait>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            user_service,
            password_reset_service,
            jwt_service,
        }
    }
}
