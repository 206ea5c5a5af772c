//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTables {
    users: HashMap<String, User>,
    /// username -> user ID
    by_username: HashMap<String, String>,
    /// email -> user ID
    by_email: HashMap<String, String>,
}

/// In-memory implementation of UserRepository
///
/// All three maps sit behind one lock so the uniqueness checks and inserts
/// happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<UserTables>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut tables = UserTables::default();

        for user in users {
            let id = user.id().as_str().to_string();
            tables
                .by_username
                .insert(user.username().to_string(), id.clone());
            tables.by_email.insert(user.email().to_string(), id.clone());
            tables.users.insert(id, user);
        }

        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(id.as_str()).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        let id = user.id().as_str().to_string();

        if tables.users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if tables.by_username.contains_key(user.username())
            || tables.by_email.contains_key(user.email())
        {
            return Err(DomainError::conflict("User already registered"));
        }

        tables
            .by_username
            .insert(user.username().to_string(), id.clone());
        tables.by_email.insert(user.email().to_string(), id.clone());
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        let id = user.id().as_str().to_string();

        let Some(old_user) = tables.users.get(&id) else {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        };

        let old_username = old_user.username().to_string();
        let old_email = old_user.email().to_string();

        if old_username != user.username() {
            if tables.by_username.contains_key(user.username()) {
                return Err(DomainError::conflict(format!(
                    "Username '{}' already exists",
                    user.username()
                )));
            }
            tables.by_username.remove(&old_username);
            tables
                .by_username
                .insert(user.username().to_string(), id.clone());
        }

        if old_email != user.email() {
            if tables.by_email.contains_key(user.email()) {
                return Err(DomainError::conflict("Email already registered"));
            }
            tables.by_email.remove(&old_email);
            tables.by_email.insert(user.email().to_string(), id.clone());
        }

        tables.users.insert(id, user.clone());
        Ok(user.clone())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.tables.read().await.users.len())
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;

        match tables.users.get_mut(id.as_str()) {
            Some(user) => {
                user.record_login();
                Ok(())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(username: &str, email: &str) -> User {
        User::new(UserId::generate(), username, email, "hashed_password")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("alice", "alice@example.com");

        repo.create(user.clone()).await.unwrap();

        let retrieved = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.username(), "alice");
    }

    #[tokio::test]
    async fn test_lookup_by_username_and_email() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("alice", "alice@example.com");
        repo.create(user.clone()).await.unwrap();

        let by_name = repo.get_by_username("alice").await.unwrap().unwrap();
        let by_email = repo.get_by_email("alice@example.com").await.unwrap().unwrap();

        assert_eq!(by_name.id(), user.id());
        assert_eq!(by_email.id(), user.id());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(repo.get_by_email("Alice@Example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_uniqueness() {
        let repo = InMemoryUserRepository::new();

        repo.create(create_test_user("alice", "a1@example.com"))
            .await
            .unwrap();

        let result = repo.create(create_test_user("alice", "a2@example.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryUserRepository::new();

        repo.create(create_test_user("alice", "shared@example.com"))
            .await
            .unwrap();

        let result = repo
            .create(create_test_user("bob", "shared@example.com"))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("alice", "alice@example.com");
        repo.create(user.clone()).await.unwrap();

        user.set_password_hash("new_hash");
        repo.update(&user).await.unwrap();

        let retrieved = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.password_hash(), "new_hash");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("ghost", "ghost@example.com");

        let result = repo.update(&user).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_with_users_and_count() {
        let repo = InMemoryUserRepository::with_users(vec![
            create_test_user("alice", "alice@example.com"),
            create_test_user("bob", "bob@example.com"),
        ]);

        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(repo.get_by_email("bob@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("alice", "alice@example.com");
        repo.create(user.clone()).await.unwrap();

        repo.record_login(user.id()).await.unwrap();

        let retrieved = repo.get(user.id()).await.unwrap().unwrap();
        assert!(retrieved.last_login_at().is_some());
    }
}
