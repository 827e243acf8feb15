mod assignments;
mod permissions;
mod records;
mod roles;

pub use assignments::AssignmentRepository;
pub use permissions::PermissionRepository;
pub use records::{CatalogSyncReport, NewRoleRecord, RoleRecordUpdate};
pub use roles::RoleRepository;
