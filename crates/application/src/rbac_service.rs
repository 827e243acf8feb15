//! RBAC assignment engine.
//!
//! Owns role lifecycle and the two replace-set operations. Every reference
//! is validated before the first write so a rejected call never leaves a
//! partially applied set behind. Atomicity of delete-then-insert is the
//! repository's job; this service decides what may be written.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use tracing::warn;

use wqp_core::{AppError, AppResult, ReferenceKind};
use wqp_domain::{PermissionCatalog, PermissionId, Role, RoleId, RoleName, UserId};

use crate::{AssignmentRepository, RoleRepository, UserRepository};

mod assignments;
mod inputs;
mod provisioning;
mod queries;
mod roles;


pub use inputs::{
    CreateRoleInput, ProvisionRoleInput, ReviseRoleInput, RoleDetail, UpdateRoleInput,
};

/// Application service for role, membership and grant administration.
#[derive(Clone)]
pub struct RbacService {
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserRepository>,
    assignment_repository: Arc<dyn AssignmentRepository>,
    catalog: Arc<PermissionCatalog>,
}

impl RbacService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserRepository>,
        assignment_repository: Arc<dyn AssignmentRepository>,
        catalog: Arc<PermissionCatalog>,
    ) -> Self {
        Self {
            role_repository,
            user_repository,
            assignment_repository,
            catalog,
        }
    }

    /// Returns the catalog grants are validated against.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        self.catalog.as_ref()
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn require_role_named(&self, role_name: &str) -> AppResult<Role> {
        self.role_repository
            .find_role_by_name(role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))
    }

    /// Fails with `DuplicateKey` when another role already carries the name.
    async fn ensure_name_available(
        &self,
        name: &RoleName,
        owner: Option<RoleId>,
    ) -> AppResult<()> {
        match self.role_repository.find_role_by_name(name.as_str()).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::DuplicateKey(
                format!("role '{name}' already exists"),
            )),
            _ => Ok(()),
        }
    }

    async fn ensure_users_exist(&self, user_ids: &[UserId]) -> AppResult<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let missing = self.user_repository.find_missing_user_ids(user_ids).await?;
        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::invalid_reference(
            ReferenceKind::User,
            missing.iter().map(ToString::to_string),
        ))
    }

    fn ensure_permissions_in_catalog(&self, permission_ids: &[PermissionId]) -> AppResult<()> {
        let unknown = self.catalog.unknown_ids(permission_ids);
        if unknown.is_empty() {
            return Ok(());
        }

        Err(AppError::invalid_reference(
            ReferenceKind::Permission,
            unknown.into_iter().map(ToString::to_string),
        ))
    }
}

/// Drops repeated values, keeping the first occurrence.
fn dedup_preserving_order<T>(values: Vec<T>) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Resolves a duplicate-key failure raised by a replace-set.
///
/// A concurrent writer inserting the same pair is a no-op when the stored
/// set already equals the requested one. Any other outcome is surfaced.
fn settle_duplicate_key<T>(
    error: AppError,
    requested: &[T],
    stored: &[T],
    relation: &str,
) -> AppResult<()>
where
    T: Clone + Eq + Hash,
{
    let requested = requested.iter().cloned().collect::<HashSet<_>>();
    let stored = stored.iter().cloned().collect::<HashSet<_>>();

    if requested == stored {
        warn!(relation, %error, "concurrent replace-set wrote the same rows; treating as no-op");
        return Ok(());
    }

    Err(error)
}
