use async_trait::async_trait;

use wqp_core::AppResult;
use wqp_domain::{Role, RoleId};

use super::records::{NewRoleRecord, RoleRecordUpdate};

/// Repository port for role rows.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Inserts a role. A taken name fails with `AppError::DuplicateKey`.
    async fn create_role(&self, record: NewRoleRecord) -> AppResult<Role>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by exact, case-sensitive name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Lists roles ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Updates a role row. Returns `None` when the role does not exist.
    ///
    /// Grants stored under the previous name are left untouched.
    async fn update_role(
        &self,
        role_id: RoleId,
        update: RoleRecordUpdate,
    ) -> AppResult<Option<Role>>;

    /// Deletes a role together with its memberships and the grants stored
    /// under its current name, in one transaction.
    ///
    /// Returns `false` when the role does not exist.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool>;
}
