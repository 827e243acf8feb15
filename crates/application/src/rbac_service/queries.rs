use tracing::debug;

use wqp_domain::Permission;

use super::*;

impl RbacService {
    /// Returns the permission records granted under a role name.
    ///
    /// A name without grants, or without a role row at all, yields an empty
    /// list. Order is by id but callers must not rely on it.
    pub async fn effective_permissions_for_role(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<Permission>> {
        let permissions = self
            .assignment_repository
            .list_role_permissions(role_name)
            .await?;
        debug!(role_name, count = permissions.len(), "resolved role permissions");
        Ok(permissions)
    }

    /// Returns the granted permission ids for a role name.
    pub async fn role_permission_ids(&self, role_name: &str) -> AppResult<Vec<PermissionId>> {
        Ok(self
            .effective_permissions_for_role(role_name)
            .await?
            .into_iter()
            .map(|permission| permission.id)
            .collect())
    }

    /// Returns the member ids of a role.
    pub async fn role_member_ids(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        self.require_role(role_id).await?;
        Ok(self
            .assignment_repository
            .list_role_members(role_id)
            .await?
            .into_iter()
            .map(|member| member.id)
            .collect())
    }

    /// Returns the roles a user is a member of.
    pub async fn roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        if self.user_repository.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        self.assignment_repository.list_roles_for_user(user_id).await
    }

    /// Returns one role with its members and grants.
    pub async fn role_detail(&self, role_id: RoleId) -> AppResult<RoleDetail> {
        let role = self.require_role(role_id).await?;
        self.attach_detail(role).await
    }

    /// Returns every role with its members and grants.
    ///
    /// Issues two reads per role on top of the listing. Fine for an admin
    /// screen with tens of roles; batch the joins before using it anywhere
    /// hot.
    pub async fn roles_with_detail(&self) -> AppResult<Vec<RoleDetail>> {
        let roles = self.role_repository.list_roles().await?;
        let mut details = Vec::with_capacity(roles.len());

        for role in roles {
            details.push(self.attach_detail(role).await?);
        }

        debug!(count = details.len(), "listed roles with detail");
        Ok(details)
    }

    pub(super) async fn attach_detail(&self, role: Role) -> AppResult<RoleDetail> {
        let members = self.assignment_repository.list_role_members(role.id).await?;
        let permissions = self
            .assignment_repository
            .list_role_permissions(role.name.as_str())
            .await?;

        Ok(RoleDetail {
            role,
            members,
            permissions,
        })
    }
}
