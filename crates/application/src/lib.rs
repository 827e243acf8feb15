//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod catalog_bootstrap_service;
mod rbac_ports;
mod rbac_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationService, AuthorizationSnapshot};
pub use catalog_bootstrap_service::CatalogBootstrapService;
pub use rbac_ports::{
    AssignmentRepository, CatalogSyncReport, NewRoleRecord, PermissionRepository,
    RoleRecordUpdate, RoleRepository,
};
pub use rbac_service::{
    CreateRoleInput, ProvisionRoleInput, RbacService, ReviseRoleInput, RoleDetail,
    UpdateRoleInput,
};
pub use user_service::{
    BatchRegistrationReport, BatchRowFailure, NewUserRecord, PasswordHasher, RegisterUserInput,
    UpdateUserInput, UserRecordUpdate, UserRepository, UserService,
};
