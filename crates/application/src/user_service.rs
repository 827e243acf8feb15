//! User entity store ports and application service.
//!
//! Owns the user rows the RBAC engine assigns to roles: registration,
//! profile updates and deletion. Credentials are hashed through a port so
//! this crate stays free of cryptographic dependencies.

use std::sync::Arc;

use async_trait::async_trait;

use wqp_core::{AppError, AppResult};
use wqp_domain::{EmailAddress, User, UserId, Username};

mod management;
mod registration;
mod retrieval;

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Validated payload for inserting a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Unique login name.
    pub username: Username,
    /// Optional contact address.
    pub email: Option<EmailAddress>,
    /// Opaque credential hash.
    pub credential_hash: String,
    /// Legacy scalar role label.
    pub role_label: String,
}

/// Validated payload for replacing a user's profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecordUpdate {
    /// Unique login name.
    pub username: Username,
    /// Optional contact address.
    pub email: Option<EmailAddress>,
    /// Legacy scalar role label.
    pub role_label: String,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. A taken username fails with `AppError::DuplicateKey`.
    async fn create_user(&self, record: NewUserRecord) -> AppResult<User>;

    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by exact username.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Lists users ordered by username.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Replaces profile fields. Returns `None` when the user does not exist.
    async fn update_user(
        &self,
        user_id: UserId,
        update: UserRecordUpdate,
    ) -> AppResult<Option<User>>;

    /// Deletes a user and its role memberships in one transaction.
    ///
    /// Returns `false` when the user does not exist.
    async fn delete_user(&self, user_id: UserId) -> AppResult<bool>;

    /// Returns the ids from `user_ids` that have no user row.
    async fn find_missing_user_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserId>>;
}

/// Port for password hashing. Keeps the application free of direct
/// cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into an opaque credential string.
    fn hash_password(&self, password: &str) -> AppResult<String>;
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Input payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserInput {
    /// Unique login name.
    pub username: String,
    /// Optional contact address. Blank values are treated as absent.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: String,
    /// Legacy role label. Defaults to `user`.
    pub role_label: Option<String>,
}

/// Input payload for replacing a user's profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Unique login name.
    pub username: String,
    /// Optional contact address. Blank values clear it.
    pub email: Option<String>,
    /// Legacy role label.
    pub role_label: String,
}

/// One batch row that was not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRowFailure {
    /// 1-based position in the submitted batch.
    pub row: usize,
    /// Username as submitted.
    pub username: String,
    /// Why the row was skipped.
    pub reason: String,
}

/// Outcome of a batch registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRegistrationReport {
    /// Users created, in submission order.
    pub created: Vec<User>,
    /// Rows skipped, in submission order.
    pub failures: Vec<BatchRowFailure>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for user records.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Fails with `DuplicateKey` when another user already carries the name.
    async fn ensure_username_available(
        &self,
        username: &Username,
        owner: Option<UserId>,
    ) -> AppResult<()> {
        match self
            .user_repository
            .find_user_by_username(username.as_str())
            .await?
        {
            Some(existing) if Some(existing.id) != owner => Err(AppError::DuplicateKey(
                format!("username '{}' is already taken", username.as_str()),
            )),
            _ => Ok(()),
        }
    }
}

fn parse_optional_email(value: Option<String>) -> AppResult<Option<EmailAddress>> {
    value
        .filter(|email| !email.trim().is_empty())
        .map(EmailAddress::new)
        .transpose()
}
