use async_trait::async_trait;

use wqp_core::AppResult;
use wqp_domain::{Permission, PermissionId, Role, RoleId, RoleName, UserId, UserSummary};

/// Repository port for the two junction sets.
///
/// Both replace operations swap the whole set atomically: readers observe
/// either the previous set or the new one, never a mix. Duplicate ids in the
/// input collapse to one row.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Replaces the members of a role.
    ///
    /// Fails with `AppError::NotFound` when the role is gone and with
    /// `AppError::InvalidReference` when a user id does not resolve. Either
    /// failure leaves the previous set intact.
    async fn replace_role_members(&self, role_id: RoleId, user_ids: &[UserId]) -> AppResult<()>;

    /// Replaces the grants stored under a role name.
    ///
    /// Fails with `AppError::NotFound` when no role carries the name and with
    /// `AppError::InvalidReference` when a permission id is not stored.
    async fn replace_role_permissions(
        &self,
        role_name: &RoleName,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// Lists members of a role ordered by username.
    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<UserSummary>>;

    /// Lists permissions granted under a role name, ordered by id.
    ///
    /// Grants are keyed by name string, so orphaned grants from a renamed
    /// role are still returned for the old name.
    async fn list_role_permissions(&self, role_name: &str) -> AppResult<Vec<Permission>>;

    /// Lists roles a user is a member of, ordered by name.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;
}
