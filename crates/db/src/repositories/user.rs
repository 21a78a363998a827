//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
};

/// Message for an insert that hits the unique email index.
pub const DUPLICATE_EMAIL: &str = "A user with this email already exists";

/// Map an insert failure, reporting a taken email as a client error.
fn insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::BadRequest(DUPLICATE_EMAIL.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by normalized email address.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    ///
    /// A concurrent registration that wins the race for the same email
    /// surfaces here as [`AppError::BadRequest`].
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(insert_error)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$salt$hash".to_string(),
            bio: None,
            image: user::DEFAULT_IMAGE.to_string(),
            role: UserRole::User,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_insert_error_other_failures_are_database_errors() {
        let err = insert_error(DbErr::Custom("connection reset".to_string()));

        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let user = create_test_user("u1", "alice@example.com");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let found = repo.find_by_email("alice@example.com").await.unwrap();

        assert_eq!(found.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let users = repo.find_by_ids(&[]).await.unwrap();

        assert!(users.is_empty());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = create_test_user("u1", "alice@example.com");
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["role"], "user");
    }
}
