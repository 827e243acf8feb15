use std::sync::Arc;

use sqlx::PgPool;
use wqp_application::{AuthorizationService, PermissionRepository, RbacService, UserService};

/// Storage the process was started against.
#[derive(Clone)]
pub enum StorageHandle {
    Postgres(PgPool),
    Memory,
}

impl StorageHandle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rbac_service: RbacService,
    pub user_service: UserService,
    pub authorization_service: AuthorizationService,
    pub permission_repository: Arc<dyn PermissionRepository>,
    pub storage: StorageHandle,
    pub admin_api_token: Arc<str>,
}
