use tracing::info;

use super::*;

impl RbacService {
    /// Sets the members of a role to exactly `user_ids`.
    ///
    /// Duplicate ids collapse to one membership. An empty set removes every
    /// member. Unknown users fail the call before anything is written.
    pub async fn replace_role_members(
        &self,
        role_id: RoleId,
        user_ids: Vec<UserId>,
    ) -> AppResult<()> {
        self.require_role(role_id).await?;
        let user_ids = dedup_preserving_order(user_ids);
        self.ensure_users_exist(&user_ids).await?;

        self.write_role_members(role_id, &user_ids).await?;

        info!(role_id = %role_id, members = user_ids.len(), "role members replaced");
        Ok(())
    }

    /// Sets the grants stored under a role name to exactly `permission_ids`.
    ///
    /// Every id must be defined by the permission catalog.
    pub async fn replace_role_permissions(
        &self,
        role_name: &str,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        let role = self.require_role_named(role_name).await?;
        let permission_ids = dedup_preserving_order(permission_ids);
        self.ensure_permissions_in_catalog(&permission_ids)?;

        self.write_role_permissions(&role.name, &permission_ids)
            .await?;

        info!(
            role_name = %role.name,
            grants = permission_ids.len(),
            "role permissions replaced"
        );
        Ok(())
    }

    /// Writes a validated, deduplicated member set.
    pub(super) async fn write_role_members(
        &self,
        role_id: RoleId,
        user_ids: &[UserId],
    ) -> AppResult<()> {
        match self
            .assignment_repository
            .replace_role_members(role_id, user_ids)
            .await
        {
            Err(error @ AppError::DuplicateKey(_)) => {
                let stored = self
                    .assignment_repository
                    .list_role_members(role_id)
                    .await?
                    .into_iter()
                    .map(|member| member.id)
                    .collect::<Vec<_>>();
                settle_duplicate_key(error, user_ids, &stored, "user_roles")
            }
            outcome => outcome,
        }
    }

    /// Writes a validated, deduplicated grant set.
    pub(super) async fn write_role_permissions(
        &self,
        role_name: &RoleName,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        match self
            .assignment_repository
            .replace_role_permissions(role_name, permission_ids)
            .await
        {
            Err(error @ AppError::DuplicateKey(_)) => {
                let stored = self
                    .assignment_repository
                    .list_role_permissions(role_name.as_str())
                    .await?
                    .into_iter()
                    .map(|permission| permission.id)
                    .collect::<Vec<_>>();
                settle_duplicate_key(error, permission_ids, &stored, "role_permissions")
            }
            outcome => outcome,
        }
    }
}
