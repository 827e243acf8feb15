use tracing::{error, info};

use crate::rbac_ports::NewRoleRecord;

use super::*;

impl RbacService {
    /// Creates a role and attaches its initial grants and members.
    ///
    /// All references are checked before the role row is written. If a set
    /// cannot be written afterwards the role exists without it and the call
    /// fails with `PartialFailure`.
    pub async fn provision_role(&self, input: ProvisionRoleInput) -> AppResult<RoleDetail> {
        let name = RoleName::new(input.name)?;
        let permission_ids = input.permission_ids.map(dedup_preserving_order);
        let user_ids = input.user_ids.map(dedup_preserving_order);

        self.ensure_name_available(&name, None).await?;
        self.validate_sets(permission_ids.as_deref(), user_ids.as_deref())
            .await?;

        let role = self
            .role_repository
            .create_role(NewRoleRecord {
                name,
                description: input.description.unwrap_or_default().trim().to_owned(),
            })
            .await?;
        info!(role_id = %role.id, role_name = %role.name, "role created");

        self.apply_sets(&role, permission_ids.as_deref(), user_ids.as_deref())
            .await
            .map_err(|error| partial_failure("created", &role, error))?;

        self.attach_detail(role).await
    }

    /// Updates a role row and optionally replaces its grants and members.
    ///
    /// Replacement grants are written under the new name. Grants left under
    /// a previous name stay where they are.
    pub async fn revise_role(
        &self,
        role_id: RoleId,
        input: ReviseRoleInput,
    ) -> AppResult<RoleDetail> {
        self.require_role(role_id).await?;
        let permission_ids = input.permission_ids.map(dedup_preserving_order);
        let user_ids = input.user_ids.map(dedup_preserving_order);
        self.validate_sets(permission_ids.as_deref(), user_ids.as_deref())
            .await?;

        let role = self
            .update_role(
                role_id,
                UpdateRoleInput {
                    name: input.name,
                    description: input.description,
                },
            )
            .await?;

        self.apply_sets(&role, permission_ids.as_deref(), user_ids.as_deref())
            .await
            .map_err(|error| partial_failure("updated", &role, error))?;

        self.attach_detail(role).await
    }

    async fn validate_sets(
        &self,
        permission_ids: Option<&[PermissionId]>,
        user_ids: Option<&[UserId]>,
    ) -> AppResult<()> {
        if let Some(permission_ids) = permission_ids {
            self.ensure_permissions_in_catalog(permission_ids)?;
        }

        if let Some(user_ids) = user_ids {
            self.ensure_users_exist(user_ids).await?;
        }

        Ok(())
    }

    async fn apply_sets(
        &self,
        role: &Role,
        permission_ids: Option<&[PermissionId]>,
        user_ids: Option<&[UserId]>,
    ) -> AppResult<()> {
        if let Some(permission_ids) = permission_ids {
            self.write_role_permissions(&role.name, permission_ids)
                .await?;
            info!(
                role_name = %role.name,
                grants = permission_ids.len(),
                "role permissions replaced"
            );
        }

        if let Some(user_ids) = user_ids {
            self.write_role_members(role.id, user_ids).await?;
            info!(role_id = %role.id, members = user_ids.len(), "role members replaced");
        }

        Ok(())
    }
}

fn partial_failure(step: &str, role: &Role, cause: AppError) -> AppError {
    error!(
        role_id = %role.id,
        role_name = %role.name,
        error = %cause,
        "role {step} but its assignments were not applied"
    );
    AppError::PartialFailure(format!(
        "role '{}' was {step} but its assignments were not applied: {cause}",
        role.name
    ))
}
