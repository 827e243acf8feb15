//! PostgreSQL-backed role, permission and assignment repository.
//!
//! Replace-set writes lock the role row, delete its junction rows and bulk
//! insert the new set inside one transaction. Readers at the default
//! isolation level see the old set or the new one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use wqp_application::{
    AssignmentRepository, CatalogSyncReport, NewRoleRecord, PermissionRepository,
    RoleRecordUpdate, RoleRepository,
};
use wqp_core::{AppError, AppResult, ReferenceKind};
use wqp_domain::{
    Permission, PermissionCatalog, PermissionId, Role, RoleId, RoleName, UserId, UserSummary,
};

use crate::postgres_errors::{
    commit_error, is_foreign_key_violation, is_unique_violation, storage_error,
};

mod assignments;
mod permissions;
mod roles;

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the RBAC repository ports.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let name = RoleName::new(row.name).map_err(|error| {
            AppError::Internal(format!("stored role '{}' is corrupt: {error}", row.id))
        })?;

        Ok(Self {
            id: RoleId::from_uuid(row.id),
            name,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: String,
    name: String,
    category: String,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let id = row.id.clone();
        Permission::new(row.id, row.name, row.category).map_err(|error| {
            AppError::Internal(format!("stored permission '{id}' is corrupt: {error}"))
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    id: uuid::Uuid,
    username: String,
    email: Option<String>,
    role: String,
}

impl From<MemberRow> for UserSummary {
    fn from(row: MemberRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            role_label: row.role,
        }
    }
}

#[async_trait]
impl RoleRepository for PostgresRbacRepository {
    async fn create_role(&self, record: NewRoleRecord) -> AppResult<Role> {
        self.create_role_impl(record).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_role_impl(role_id).await
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.find_role_by_name_impl(name).await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.list_roles_impl().await
    }

    async fn update_role(
        &self,
        role_id: RoleId,
        update: RoleRecordUpdate,
    ) -> AppResult<Option<Role>> {
        self.update_role_impl(role_id, update).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        self.delete_role_impl(role_id).await
    }
}

#[async_trait]
impl PermissionRepository for PostgresRbacRepository {
    async fn sync_catalog(
        &self,
        catalog: &PermissionCatalog,
        prune: bool,
    ) -> AppResult<CatalogSyncReport> {
        self.sync_catalog_impl(catalog, prune).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl().await
    }
}

#[async_trait]
impl AssignmentRepository for PostgresRbacRepository {
    async fn replace_role_members(&self, role_id: RoleId, user_ids: &[UserId]) -> AppResult<()> {
        self.replace_role_members_impl(role_id, user_ids).await
    }

    async fn replace_role_permissions(
        &self,
        role_name: &RoleName,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.replace_role_permissions_impl(role_name, permission_ids)
            .await
    }

    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<UserSummary>> {
        self.list_role_members_impl(role_id).await
    }

    async fn list_role_permissions(&self, role_name: &str) -> AppResult<Vec<Permission>> {
        self.list_role_permissions_impl(role_name).await
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        self.list_roles_for_user_impl(user_id).await
    }
}

fn role_conflict_or_storage(
    error: sqlx::Error,
    role_name: &RoleName,
    operation: &str,
) -> AppError {
    if is_unique_violation(&error) {
        return AppError::DuplicateKey(format!("role '{role_name}' already exists"));
    }

    storage_error(error, operation)
}
