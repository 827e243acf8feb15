use std::sync::Arc;

use wqp_application::{AssignmentRepository, PermissionRepository, RoleRepository, UserRepository};
use wqp_infrastructure::{InMemoryRbacStore, PostgresRbacRepository, PostgresUserRepository};

use crate::state::StorageHandle;

pub(super) struct RepositorySet {
    pub(super) user_repository: Arc<dyn UserRepository>,
    pub(super) role_repository: Arc<dyn RoleRepository>,
    pub(super) permission_repository: Arc<dyn PermissionRepository>,
    pub(super) assignment_repository: Arc<dyn AssignmentRepository>,
}

pub(super) fn build_repository_set(storage: &StorageHandle) -> RepositorySet {
    match storage {
        StorageHandle::Postgres(pool) => {
            let rbac_repository = Arc::new(PostgresRbacRepository::new(pool.clone()));
            RepositorySet {
                user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
                role_repository: rbac_repository.clone(),
                permission_repository: rbac_repository.clone(),
                assignment_repository: rbac_repository,
            }
        }
        StorageHandle::Memory => {
            let store = Arc::new(InMemoryRbacStore::new());
            RepositorySet {
                user_repository: store.clone(),
                role_repository: store.clone(),
                permission_repository: store.clone(),
                assignment_repository: store,
            }
        }
    }
}
