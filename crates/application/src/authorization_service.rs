use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use wqp_core::{AppError, AppResult};
use wqp_domain::{LegacyRolePolicy, Permission, PermissionId, Role, User, UserId, UserSummary};

use crate::{AssignmentRepository, RoleRepository, UserRepository};


/// Everything a client needs to decide what the user may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationSnapshot {
    /// User projection without credential material.
    pub user: UserSummary,
    /// Relational role memberships.
    pub roles: Vec<Role>,
    /// Effective permissions under the configured policy.
    pub permissions: Vec<Permission>,
    /// Policy the permissions were resolved with.
    pub policy: LegacyRolePolicy,
}

/// Read-only facade answering "what can this user do".
#[derive(Clone)]
pub struct AuthorizationService {
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    assignment_repository: Arc<dyn AssignmentRepository>,
    policy: LegacyRolePolicy,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        assignment_repository: Arc<dyn AssignmentRepository>,
        policy: LegacyRolePolicy,
    ) -> Self {
        Self {
            user_repository,
            role_repository,
            assignment_repository,
            policy,
        }
    }

    /// Returns the configured legacy label policy.
    #[must_use]
    pub fn policy(&self) -> LegacyRolePolicy {
        self.policy
    }

    /// Returns the union of grants across the user's roles, one record per id.
    ///
    /// A user without roles gets an empty list. A legacy label that names no
    /// role row contributes nothing, even when grants are still stored under
    /// that name from before a rename.
    pub async fn permissions_for_user(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        let user = self.require_user(user_id).await?;
        let roles = if self.policy.uses_memberships() {
            self.assignment_repository
                .list_roles_for_user(user_id)
                .await?
        } else {
            Vec::new()
        };

        self.resolve_permissions(&user, &roles).await
    }

    /// Returns whether the user currently holds the permission.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        permission_id: &PermissionId,
    ) -> AppResult<bool> {
        Ok(self
            .permissions_for_user(user_id)
            .await?
            .iter()
            .any(|permission| &permission.id == permission_id))
    }

    /// Ensures the user holds the permission.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        permission_id: &PermissionId,
    ) -> AppResult<()> {
        if self.has_permission(user_id, permission_id).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{permission_id}'"
        )))
    }

    /// Returns the user, its memberships and effective permissions.
    pub async fn authorization_snapshot(
        &self,
        user_id: UserId,
    ) -> AppResult<AuthorizationSnapshot> {
        let user = self.require_user(user_id).await?;
        let roles = self
            .assignment_repository
            .list_roles_for_user(user_id)
            .await?;
        let contributing_roles = if self.policy.uses_memberships() {
            roles.as_slice()
        } else {
            &[]
        };
        let permissions = self.resolve_permissions(&user, contributing_roles).await?;

        Ok(AuthorizationSnapshot {
            user: user.summary(),
            roles,
            permissions,
            policy: self.policy,
        })
    }

    async fn require_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    async fn resolve_permissions(
        &self,
        user: &User,
        roles: &[Role],
    ) -> AppResult<Vec<Permission>> {
        let mut role_names = roles
            .iter()
            .map(|role| role.name.as_str())
            .collect::<Vec<_>>();

        if self.policy.uses_legacy_label() && !role_names.contains(&user.role_label.as_str()) {
            if self
                .role_repository
                .find_role_by_name(user.role_label.as_str())
                .await?
                .is_some()
            {
                role_names.push(user.role_label.as_str());
            } else {
                debug!(
                    user_id = %user.id,
                    role_label = user.role_label.as_str(),
                    "legacy role label names no role"
                );
            }
        }

        let mut permissions = BTreeMap::new();
        for role_name in role_names {
            for permission in self
                .assignment_repository
                .list_role_permissions(role_name)
                .await?
            {
                permissions
                    .entry(permission.id.clone())
                    .or_insert(permission);
            }
        }

        debug!(
            user_id = %user.id,
            policy = self.policy.as_str(),
            count = permissions.len(),
            "resolved user permissions"
        );
        Ok(permissions.into_values().collect())
    }
}
