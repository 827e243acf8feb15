//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod permission;
mod policy;
mod role;
mod user;

pub use catalog::{PermissionCatalog, RoleGrantSeed};
pub use permission::{Permission, PermissionId};
pub use policy::LegacyRolePolicy;
pub use role::{Role, RoleId, RoleName};
pub use user::{
    DEFAULT_ROLE_LABEL, EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, User, UserId,
    UserSummary, Username, validate_password, validate_role_label,
};
