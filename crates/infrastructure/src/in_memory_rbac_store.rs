use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use wqp_application::{
    AssignmentRepository, CatalogSyncReport, NewRoleRecord, NewUserRecord, PermissionRepository,
    RoleRecordUpdate, RoleRepository, UserRecordUpdate, UserRepository,
};
use wqp_core::{AppError, AppResult, ReferenceKind};
use wqp_domain::{
    Permission, PermissionCatalog, PermissionId, Role, RoleId, RoleName, User, UserId,
    UserSummary,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct RbacState {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    role_permissions: BTreeSet<(String, PermissionId)>,
}

impl RbacState {
    fn role_named(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|role| role.name.as_str() == name)
    }
}

/// In-memory implementation of every RBAC repository port.
///
/// One lock guards all tables, so each call is atomic with respect to every
/// other call.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    state: RwLock<RbacState>,
}

impl InMemoryRbacStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRbacStore {
    async fn create_user(&self, record: NewUserRecord) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.username == record.username)
        {
            return Err(AppError::DuplicateKey(format!(
                "username '{}' is already taken",
                record.username.as_str()
            )));
        }

        let user = User {
            id: UserId::new(),
            username: record.username,
            email: record.email,
            credential_hash: record.credential_hash,
            role_label: record.role_label,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.username.as_str() == username)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users = self
            .state
            .read()
            .await
            .users
            .values()
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|left, right| left.username.as_str().cmp(right.username.as_str()));
        Ok(users)
    }

    async fn update_user(
        &self,
        user_id: UserId,
        update: UserRecordUpdate,
    ) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.id != user_id && user.username == update.username)
        {
            return Err(AppError::DuplicateKey(format!(
                "username '{}' is already taken",
                update.username.as_str()
            )));
        }

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };

        user.username = update.username;
        user.email = update.email;
        user.role_label = update.role_label;
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        state
            .user_roles
            .retain(|(stored_user_id, _)| *stored_user_id != user_id);
        Ok(true)
    }

    async fn find_missing_user_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter(|user_id| !state.users.contains_key(user_id))
            .copied()
            .collect())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacStore {
    async fn create_role(&self, record: NewRoleRecord) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state.role_named(record.name.as_str()).is_some() {
            return Err(AppError::DuplicateKey(format!(
                "role '{}' already exists",
                record.name
            )));
        }

        let role = Role {
            id: RoleId::new(),
            name: record.name,
            description: record.description,
            created_at: Utc::now(),
        };
        state.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.role_named(name).cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles = self
            .state
            .read()
            .await
            .roles
            .values()
            .cloned()
            .collect::<Vec<_>>();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn update_role(
        &self,
        role_id: RoleId,
        update: RoleRecordUpdate,
    ) -> AppResult<Option<Role>> {
        let mut state = self.state.write().await;
        if state
            .role_named(update.name.as_str())
            .is_some_and(|existing| existing.id != role_id)
        {
            return Err(AppError::DuplicateKey(format!(
                "role '{}' already exists",
                update.name
            )));
        }

        let Some(role) = state.roles.get_mut(&role_id) else {
            return Ok(None);
        };

        role.name = update.name;
        role.description = update.description;
        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(role) = state.roles.remove(&role_id) else {
            return Ok(false);
        };

        state
            .role_permissions
            .retain(|(stored_name, _)| stored_name != role.name.as_str());
        state
            .user_roles
            .retain(|(_, stored_role_id)| *stored_role_id != role_id);
        Ok(true)
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacStore {
    async fn sync_catalog(
        &self,
        catalog: &PermissionCatalog,
        prune: bool,
    ) -> AppResult<CatalogSyncReport> {
        let mut state = self.state.write().await;
        for permission in catalog.iter() {
            state
                .permissions
                .insert(permission.id.clone(), permission.clone());
        }

        let mut pruned = 0;
        if prune {
            let before = state.permissions.len();
            state.permissions.retain(|id, _| catalog.contains(id));
            pruned = before - state.permissions.len();
            state
                .role_permissions
                .retain(|(_, permission_id)| catalog.contains(permission_id));
        }

        Ok(CatalogSyncReport {
            upserted: catalog.len(),
            pruned,
        })
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRbacStore {
    async fn replace_role_members(&self, role_id: RoleId, user_ids: &[UserId]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        let missing = user_ids
            .iter()
            .filter(|user_id| !state.users.contains_key(user_id))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(AppError::invalid_reference(ReferenceKind::User, missing));
        }

        state
            .user_roles
            .retain(|(_, stored_role_id)| *stored_role_id != role_id);
        state
            .user_roles
            .extend(user_ids.iter().map(|user_id| (*user_id, role_id)));
        Ok(())
    }

    async fn replace_role_permissions(
        &self,
        role_name: &RoleName,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.role_named(role_name.as_str()).is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' does not exist"
            )));
        }

        let missing = permission_ids
            .iter()
            .filter(|permission_id| !state.permissions.contains_key(permission_id))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(AppError::invalid_reference(
                ReferenceKind::Permission,
                missing,
            ));
        }

        state
            .role_permissions
            .retain(|(stored_name, _)| stored_name != role_name.as_str());
        state.role_permissions.extend(
            permission_ids
                .iter()
                .map(|permission_id| (role_name.as_str().to_owned(), permission_id.clone())),
        );
        Ok(())
    }

    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<UserSummary>> {
        let state = self.state.read().await;
        let mut members = state
            .user_roles
            .iter()
            .filter(|(_, stored_role_id)| *stored_role_id == role_id)
            .filter_map(|(user_id, _)| state.users.get(user_id).map(User::summary))
            .collect::<Vec<_>>();
        members.sort_by(|left, right| left.username.cmp(&right.username));
        Ok(members)
    }

    async fn list_role_permissions(&self, role_name: &str) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(state
            .role_permissions
            .iter()
            .filter(|(stored_name, _)| stored_name == role_name)
            .filter_map(|(_, permission_id)| state.permissions.get(permission_id).cloned())
            .collect())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles = state
            .user_roles
            .iter()
            .filter(|(stored_user_id, _)| *stored_user_id == user_id)
            .filter_map(|(_, role_id)| state.roles.get(role_id).cloned())
            .collect::<Vec<_>>();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }
}
