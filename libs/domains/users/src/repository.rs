use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserInput};

/// Repository trait for User persistence
///
/// Email lookups (`find_by_email`, `exists_by_email`) compare
/// case-insensitively. `create` and `update` must fail with
/// [`UserError::DuplicateEmail`] when a write would violate email
/// uniqueness, so a race that slips past the service-level pre-flight
/// check still surfaces as a domain error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, assigning its identifier
    async fn create(&self, input: UserInput) -> UserResult<User>;

    /// Overwrite an existing user record
    async fn update(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// List all users in insertion order
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Check if a user with this ID exists
    async fn exists_by_id(&self, id: Uuid) -> UserResult<bool>;

    /// Check if a user with this email exists
    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    /// Delete a user by ID
    async fn delete_by_id(&self, id: Uuid) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: UserInput) -> UserResult<User> {
        let mut users = self.users.write().await;

        // Uniqueness backstop, mirroring the database unique index
        let email_exists = users
            .values()
            .any(|u| u.email.to_lowercase() == input.email.to_lowercase());

        if email_exists {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let user = User::new(input);
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        // Check for duplicate email (excluding the record being updated)
        let email_exists = users
            .values()
            .any(|u| u.id != user.id && u.email.to_lowercase() == user.email.to_lowercase());

        if email_exists {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned();
        Ok(user)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        // UUIDv7 identifiers are time-ordered, so this is insertion order
        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by_key(|u| u.id);

        Ok(result)
    }

    async fn exists_by_id(&self, id: Uuid) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.contains_key(&id))
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        let exists = users
            .values()
            .any(|u| u.email.to_lowercase() == email.to_lowercase());
        Ok(exists)
    }

    async fn delete_by_id(&self, id: Uuid) -> UserResult<()> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(())
    }
}
