use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait, Func, SimpleExpr};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entity;
use crate::error::{UserError, UserResult};
use crate::models::{User, UserInput};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
///
/// Every mutation is a single SQL statement, so a failed call leaves no
/// partial state behind. The `LOWER(email)` unique index is the
/// linearizing guard for email uniqueness; its violation is translated to
/// [`UserError::DuplicateEmail`] here, at the repository boundary.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Case-insensitive email predicate matching the unique index expression
    fn email_eq(email: &str) -> SimpleExpr {
        Expr::expr(Func::lower(Expr::col(entity::Column::Email))).eq(email.to_lowercase())
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    let err_str = e.to_string();
    err_str.contains("duplicate key") || err_str.contains("unique constraint")
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: UserInput) -> UserResult<User> {
        let email = input.email.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::DuplicateEmail(email)
            } else {
                UserError::Internal(format!("Database error: {}", e))
            }
        })?;

        tracing::info!(user_id = %model.id, email = %model.email, "Created user");
        Ok(model.into())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let id = user.id;
        let email = user.email.clone();
        let active_model: entity::ActiveModel = user.into();

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserError::NotFound(id),
            e if is_unique_violation(&e) => UserError::DuplicateEmail(email),
            e => UserError::Internal(format!("Database error: {}", e)),
        })?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(Self::email_eq(email))
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(model.map(|m| m.into()))
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        // UUIDv7 primary keys are time-ordered, so this is insertion order
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn exists_by_id(&self, id: Uuid) -> UserResult<bool> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(model.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let model = entity::Entity::find()
            .filter(Self::email_eq(email))
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(model.is_some())
    }

    async fn delete_by_id(&self, id: Uuid) -> UserResult<()> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        if result.rows_affected > 0 {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(())
    }
}
