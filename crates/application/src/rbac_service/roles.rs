use tracing::{debug, info};

use crate::rbac_ports::{NewRoleRecord, RoleRecordUpdate};

use super::*;

impl RbacService {
    /// Creates a role without grants or members.
    ///
    /// Names are unique case-sensitively: `Manager` and `manager` may coexist.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let name = RoleName::new(input.name)?;
        self.ensure_name_available(&name, None).await?;

        let role = self
            .role_repository
            .create_role(NewRoleRecord {
                name,
                description: input.description.unwrap_or_default().trim().to_owned(),
            })
            .await?;

        info!(role_id = %role.id, role_name = %role.name, "role created");
        Ok(role)
    }

    /// Returns a role by identifier.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.require_role(role_id).await
    }

    /// Returns a role by exact name, or `None` when absent.
    pub async fn find_role_by_name(&self, role_name: &str) -> AppResult<Option<Role>> {
        self.role_repository.find_role_by_name(role_name).await
    }

    /// Lists roles ordered by name.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let roles = self.role_repository.list_roles().await?;
        debug!(count = roles.len(), "listed roles");
        Ok(roles)
    }

    /// Updates a role row in place.
    ///
    /// Grants are keyed by role name and are not moved on rename: after a
    /// rename the role reports no grants until they are replaced under the
    /// new name, while the old name keeps its rows.
    pub async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let current = self.require_role(role_id).await?;
        let name = RoleName::new(input.name)?;
        self.ensure_name_available(&name, Some(role_id)).await?;

        let description = input
            .description
            .map(|description| description.trim().to_owned())
            .unwrap_or_else(|| current.description.clone());

        let updated = self
            .role_repository
            .update_role(
                role_id,
                RoleRecordUpdate {
                    name: name.clone(),
                    description,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        if current.name != name {
            self.warn_on_detached_grants(&current.name, &name).await?;
        }

        info!(role_id = %role_id, role_name = %updated.name, "role updated");
        Ok(updated)
    }

    /// Deletes a role with its memberships and the grants under its name.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        if !self.role_repository.delete_role(role_id).await? {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        info!(role_id = %role_id, "role deleted");
        Ok(())
    }

    pub(super) async fn warn_on_detached_grants(
        &self,
        previous_name: &RoleName,
        name: &RoleName,
    ) -> AppResult<()> {
        let orphaned = self
            .assignment_repository
            .list_role_permissions(previous_name.as_str())
            .await?;

        if !orphaned.is_empty() {
            warn!(
                previous_name = %previous_name,
                role_name = %name,
                orphaned_grants = orphaned.len(),
                "role renamed; grants stored under the previous name were not carried over"
            );
        }

        Ok(())
    }
}
