use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use wqp_core::{AppError, AppResult, ReferenceKind};
use wqp_domain::{
    LegacyRolePolicy, Permission, PermissionCatalog, PermissionId, Role, RoleId, RoleName, User,
    UserId, UserSummary, Username,
};

use crate::{
    AssignmentRepository, AuthorizationService, CatalogSyncReport, NewRoleRecord, NewUserRecord,
    PasswordHasher, PermissionRepository, RbacService, RoleRecordUpdate, RoleRepository,
    UserRecordUpdate, UserRepository,
};

/// Fault injected into the next junction write.
pub(crate) enum WriteFault {
    /// The write is rejected and nothing changes.
    Reject(AppError),
    /// The requested rows land, as if a concurrent writer won, but the call
    /// still reports the error.
    LandThenReport(AppError),
}

#[derive(Default)]
struct FakeState {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    role_permissions: BTreeSet<(String, PermissionId)>,
}

#[derive(Default)]
pub(crate) struct FakeRbacStore {
    state: Mutex<FakeState>,
    member_fault: Mutex<Option<WriteFault>>,
    grant_fault: Mutex<Option<WriteFault>>,
}

impl FakeRbacStore {
    pub(crate) fn with_catalog(catalog: &PermissionCatalog) -> Arc<Self> {
        let state = FakeState {
            permissions: catalog
                .iter()
                .map(|permission| (permission.id.clone(), permission.clone()))
                .collect(),
            ..FakeState::default()
        };

        Arc::new(Self {
            state: Mutex::new(state),
            ..Self::default()
        })
    }

    pub(crate) async fn seed_user(&self, username: &str, role_label: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            username: Username::new(username).unwrap_or_else(|_| unreachable!()),
            email: None,
            credential_hash: "hashed".to_owned(),
            role_label: role_label.to_owned(),
            created_at: Utc::now(),
        };
        let user_id = user.id;
        self.state.lock().await.users.insert(user_id, user);
        user_id
    }

    pub(crate) async fn member_rows(&self, role_id: RoleId) -> Vec<UserId> {
        self.state
            .lock()
            .await
            .user_roles
            .iter()
            .filter(|(_, stored_role_id)| *stored_role_id == role_id)
            .map(|(user_id, _)| *user_id)
            .collect()
    }

    pub(crate) async fn grant_rows(&self, role_name: &str) -> Vec<PermissionId> {
        self.state
            .lock()
            .await
            .role_permissions
            .iter()
            .filter(|(stored_name, _)| stored_name == role_name)
            .map(|(_, permission_id)| permission_id.clone())
            .collect()
    }

    pub(crate) async fn inject_member_fault(&self, fault: WriteFault) {
        *self.member_fault.lock().await = Some(fault);
    }

    pub(crate) async fn inject_grant_fault(&self, fault: WriteFault) {
        *self.grant_fault.lock().await = Some(fault);
    }
}

pub(crate) fn builtin_catalog() -> Arc<PermissionCatalog> {
    Arc::new(PermissionCatalog::builtin().unwrap_or_else(|error| panic!("catalog: {error}")))
}

pub(crate) fn permission_ids(ids: &[&str]) -> Vec<PermissionId> {
    ids.iter()
        .map(|id| PermissionId::new(*id).unwrap_or_else(|_| unreachable!()))
        .collect()
}

pub(crate) fn rbac_service(
    store: &Arc<FakeRbacStore>,
    catalog: Arc<PermissionCatalog>,
) -> RbacService {
    RbacService::new(store.clone(), store.clone(), store.clone(), catalog)
}

pub(crate) fn authorization_service(
    store: &Arc<FakeRbacStore>,
    policy: LegacyRolePolicy,
) -> AuthorizationService {
    AuthorizationService::new(store.clone(), store.clone(), store.clone(), policy)
}

pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed::{password}"))
    }
}

fn apply_fault(fault: Option<WriteFault>, land: impl FnOnce()) -> AppResult<()> {
    match fault {
        None => {
            land();
            Ok(())
        }
        Some(WriteFault::Reject(error)) => Err(error),
        Some(WriteFault::LandThenReport(error)) => {
            land();
            Err(error)
        }
    }
}

#[async_trait]
impl UserRepository for FakeRbacStore {
    async fn create_user(&self, record: NewUserRecord) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|user| user.username == record.username)
        {
            return Err(AppError::DuplicateKey("users_username_key".to_owned()));
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
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| user.username.as_str() == username)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users = self
            .state
            .lock()
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
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };

        user.username = update.username;
        user.email = update.email;
        user.role_label = update.role_label;
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        state
            .user_roles
            .retain(|(stored_user_id, _)| *stored_user_id != user_id);
        Ok(true)
    }

    async fn find_missing_user_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        let state = self.state.lock().await;
        Ok(user_ids
            .iter()
            .filter(|user_id| !state.users.contains_key(user_id))
            .copied()
            .collect())
    }
}

#[async_trait]
impl RoleRepository for FakeRbacStore {
    async fn create_role(&self, record: NewRoleRecord) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if state.roles.values().any(|role| role.name == record.name) {
            return Err(AppError::DuplicateKey("roles_name_key".to_owned()));
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
        Ok(self.state.lock().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .values()
            .find(|role| role.name.as_str() == name)
            .cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles = self
            .state
            .lock()
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
        let mut state = self.state.lock().await;
        let Some(role) = state.roles.get_mut(&role_id) else {
            return Ok(None);
        };

        role.name = update.name;
        role.description = update.description;
        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(role) = state.roles.remove(&role_id) else {
            return Ok(false);
        };

        state
            .user_roles
            .retain(|(_, stored_role_id)| *stored_role_id != role_id);
        state
            .role_permissions
            .retain(|(stored_name, _)| stored_name != role.name.as_str());
        Ok(true)
    }
}

#[async_trait]
impl PermissionRepository for FakeRbacStore {
    async fn sync_catalog(
        &self,
        catalog: &PermissionCatalog,
        prune: bool,
    ) -> AppResult<CatalogSyncReport> {
        let mut state = self.state.lock().await;
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
            .lock()
            .await
            .permissions
            .values()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentRepository for FakeRbacStore {
    async fn replace_role_members(&self, role_id: RoleId, user_ids: &[UserId]) -> AppResult<()> {
        let fault = self.member_fault.lock().await.take();
        let mut state = self.state.lock().await;
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

        apply_fault(fault, || {
            state
                .user_roles
                .retain(|(_, stored_role_id)| *stored_role_id != role_id);
            state
                .user_roles
                .extend(user_ids.iter().map(|user_id| (*user_id, role_id)));
        })
    }

    async fn replace_role_permissions(
        &self,
        role_name: &RoleName,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let fault = self.grant_fault.lock().await.take();
        let mut state = self.state.lock().await;
        if !state.roles.values().any(|role| &role.name == role_name) {
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
            return Err(AppError::invalid_reference(ReferenceKind::Permission, missing));
        }

        apply_fault(fault, || {
            state
                .role_permissions
                .retain(|(stored_name, _)| stored_name != role_name.as_str());
            state.role_permissions.extend(
                permission_ids
                    .iter()
                    .map(|permission_id| (role_name.as_str().to_owned(), permission_id.clone())),
            );
        })
    }

    async fn list_role_members(&self, role_id: RoleId) -> AppResult<Vec<UserSummary>> {
        let state = self.state.lock().await;
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
        let state = self.state.lock().await;
        Ok(state
            .role_permissions
            .iter()
            .filter(|(stored_name, _)| stored_name == role_name)
            .filter_map(|(_, permission_id)| state.permissions.get(permission_id).cloned())
            .collect())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
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
