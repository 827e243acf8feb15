//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use wqp_application::{NewUserRecord, UserRecordUpdate, UserRepository};
use wqp_core::{AppError, AppResult};
use wqp_domain::{EmailAddress, User, UserId, Username};

use crate::postgres_errors::{commit_error, is_unique_violation, storage_error};

mod account;
mod lookup;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    email: Option<String>,
    credential_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username).map_err(|error| {
            AppError::Internal(format!("stored user '{}' is corrupt: {error}", row.id))
        })?;
        let email = row
            .email
            .map(EmailAddress::new)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!("stored user '{}' is corrupt: {error}", row.id))
            })?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            username,
            email,
            credential_hash: row.credential_hash,
            role_label: row.role,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, record: NewUserRecord) -> AppResult<User> {
        self.create_user_impl(record).await
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.find_user_impl(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.find_user_by_username_impl(username).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.list_users_impl().await
    }

    async fn update_user(
        &self,
        user_id: UserId,
        update: UserRecordUpdate,
    ) -> AppResult<Option<User>> {
        self.update_user_impl(user_id, update).await
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        self.delete_user_impl(user_id).await
    }

    async fn find_missing_user_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        self.find_missing_user_ids_impl(user_ids).await
    }
}

fn username_conflict_or_storage(
    error: sqlx::Error,
    username: &str,
    operation: &str,
) -> AppError {
    if is_unique_violation(&error) {
        return AppError::DuplicateKey(format!("username '{username}' is already taken"));
    }

    storage_error(error, operation)
}
