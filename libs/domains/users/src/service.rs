use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserInput};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Sole authority for the email-uniqueness and existence invariants; all
/// mutations go through here. The service never caches user state and
/// never retries: every call re-reads through the repository and failures
/// surface immediately as typed errors.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user
    ///
    /// The `exists_by_email` pre-flight gives a friendly error on the
    /// common path; the repository's uniqueness guard settles concurrent
    /// races (see [`UserRepository`]).
    pub async fn create_user(&self, input: UserInput) -> UserResult<User> {
        if self.repository.exists_by_email(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        self.repository.create(input).await
    }

    /// List all users, fully materialized, in insertion order
    pub async fn get_all_users(&self) -> UserResult<Vec<User>> {
        self.repository.find_all().await
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Replace a user's name, email and phone
    ///
    /// Re-asserting the current email (in any casing) is always permitted;
    /// changing it to an email held by another user is a conflict.
    pub async fn update_user(&self, id: Uuid, input: UserInput) -> UserResult<User> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if user.email.to_lowercase() != input.email.to_lowercase()
            && self.repository.exists_by_email(&input.email).await?
        {
            return Err(UserError::DuplicateEmail(input.email));
        }

        user.apply_update(input);

        self.repository.update(user).await
    }

    /// Delete a user
    ///
    /// Not idempotent: deleting an already-deleted user is NotFound.
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.exists_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }

        self.repository.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};

    fn john_input() -> UserInput {
        UserInput {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "1234567890".to_string(),
        }
    }

    fn jane_input() -> UserInput {
        UserInput {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "0987654321".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repo = MockUserRepository::new();
        let user = User::new(john_input());
        let created = user.clone();

        repo.expect_exists_by_email()
            .withf(|email| email == "john@example.com")
            .returning(|_| Ok(false));
        repo.expect_create()
            .returning(move |_| Ok(created.clone()));

        let service = UserService::new(repo);
        let result = service.create_user(john_input()).await.unwrap();

        assert_eq!(result.id, user.id);
        assert_eq!(result.name, "John Doe");
        assert_eq!(result.email, "john@example.com");
        assert_eq!(result.phone, "1234567890");
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut repo = MockUserRepository::new();

        repo.expect_exists_by_email().returning(|_| Ok(true));
        // expect_create deliberately absent: the mock panics if the service
        // attempts the write after a failed pre-flight

        let service = UserService::new(repo);
        let result = service.create_user(john_input()).await;

        match result {
            Err(UserError::DuplicateEmail(email)) => assert_eq!(email, "john@example.com"),
            other => panic!("Expected DuplicateEmail, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_all_users() {
        let mut repo = MockUserRepository::new();
        let users = vec![User::new(john_input()), User::new(jane_input())];
        let returned = users.clone();

        repo.expect_find_all()
            .returning(move || Ok(returned.clone()));

        let service = UserService::new(repo);
        let result = service.get_all_users().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "John Doe");
        assert_eq!(result[1].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_get_user_by_id_success() {
        let mut repo = MockUserRepository::new();
        let user = User::new(john_input());
        let id = user.id;
        let found = user.clone();

        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let service = UserService::new(repo);
        let result = service.get_user_by_id(id).await.unwrap();

        assert_eq!(result, user);
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::now_v7();

        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(repo);
        let result = service.get_user_by_id(id).await;

        assert!(matches!(result, Err(UserError::NotFound(got)) if got == id));
    }

    #[tokio::test]
    async fn test_update_user_same_email_skips_uniqueness_check() {
        let mut repo = MockUserRepository::new();
        let user = User::new(john_input());
        let id = user.id;
        let found = user.clone();

        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        // expect_exists_by_email deliberately absent: an unchanged email
        // must never trigger the uniqueness check
        repo.expect_update().returning(|user| Ok(user));

        let service = UserService::new(repo);
        let mut input = john_input();
        input.name = "Updated Name".to_string();
        input.phone = "9999999999".to_string();

        let result = service.update_user(id, input).await.unwrap();

        assert_eq!(result.id, id);
        assert_eq!(result.name, "Updated Name");
        assert_eq!(result.phone, "9999999999");
        assert_eq!(result.email, "john@example.com");
    }

    #[tokio::test]
    async fn test_update_user_same_email_different_case_is_permitted() {
        let mut repo = MockUserRepository::new();
        let user = User::new(john_input());
        let id = user.id;
        let found = user.clone();

        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_update().returning(|user| Ok(user));

        let service = UserService::new(repo);
        let mut input = john_input();
        input.email = "JOHN@EXAMPLE.COM".to_string();

        let result = service.update_user(id, input).await.unwrap();
        assert_eq!(result.email, "JOHN@EXAMPLE.COM");
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::now_v7();

        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(repo);
        let result = service.update_user(id, john_input()).await;

        assert!(matches!(result, Err(UserError::NotFound(got)) if got == id));
    }

    #[tokio::test]
    async fn test_update_user_duplicate_email() {
        let mut repo = MockUserRepository::new();
        let user = User::new(john_input());
        let id = user.id;
        let found = user.clone();

        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_exists_by_email()
            .withf(|email| email == "jane@example.com")
            .returning(|_| Ok(true));
        // expect_update deliberately absent

        let service = UserService::new(repo);
        let mut input = john_input();
        input.email = "jane@example.com".to_string();

        let result = service.update_user(id, input).await;

        match result {
            Err(UserError::DuplicateEmail(email)) => assert_eq!(email, "jane@example.com"),
            other => panic!("Expected DuplicateEmail, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_user_to_free_email() {
        let mut repo = MockUserRepository::new();
        let user = User::new(john_input());
        let id = user.id;
        let found = user.clone();

        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_update().returning(|user| Ok(user));

        let service = UserService::new(repo);
        let mut input = john_input();
        input.email = "john.new@example.com".to_string();

        let result = service.update_user(id, input).await.unwrap();
        assert_eq!(result.email, "john.new@example.com");
    }

    #[tokio::test]
    async fn test_delete_user_success() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::now_v7();

        repo.expect_exists_by_id().returning(|_| Ok(true));
        repo.expect_delete_by_id()
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(repo);
        assert!(service.delete_user(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::now_v7();

        repo.expect_exists_by_id().returning(|_| Ok(false));
        // expect_delete_by_id deliberately absent

        let service = UserService::new(repo);
        let result = service.delete_user(id).await;

        assert!(matches!(result, Err(UserError::NotFound(got)) if got == id));
    }

    #[tokio::test]
    async fn test_delete_user_twice_second_is_not_found() {
        let mut repo = MockUserRepository::new();
        let id = Uuid::now_v7();
        let mut seq = mockall::Sequence::new();

        repo.expect_exists_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        repo.expect_delete_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_exists_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let service = UserService::new(repo);

        assert!(service.delete_user(id).await.is_ok());
        assert!(matches!(
            service.delete_user(id).await,
            Err(UserError::NotFound(_))
        ));
    }

    // End-to-end scenarios against the in-memory repository

    #[tokio::test]
    async fn test_scenario_create_duplicate_then_list() {
        let service = UserService::new(InMemoryUserRepository::new());

        let created = service.create_user(john_input()).await.unwrap();
        assert_eq!(created.name, "John Doe");
        assert_eq!(created.email, "john@example.com");
        assert_eq!(created.phone, "1234567890");

        // Round-trip: reading back yields the same representation
        let fetched = service.get_user_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);

        // Second user with the same email is rejected
        let mut second = john_input();
        second.name = "John Clone".to_string();
        let result = service.create_user(second).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

        let all = service.get_all_users().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], created);
    }

    #[tokio::test]
    async fn test_scenario_update_to_other_users_email() {
        let service = UserService::new(InMemoryUserRepository::new());

        let john = service.create_user(john_input()).await.unwrap();
        let jane = service.create_user(jane_input()).await.unwrap();

        let mut input = john_input();
        input.email = jane.email.clone();

        let result = service.update_user(john.id, input).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));

        // John's stored email must be unchanged
        let stored = service.get_user_by_id(john.id).await.unwrap();
        assert_eq!(stored.email, "john@example.com");
    }

    #[tokio::test]
    async fn test_scenario_delete_then_get_is_not_found() {
        let service = UserService::new(InMemoryUserRepository::new());

        let user = service.create_user(john_input()).await.unwrap();

        service.delete_user(user.id).await.unwrap();

        assert!(matches!(
            service.get_user_by_id(user.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(user.id).await,
            Err(UserError::NotFound(_))
        ));
    }
}
