//! Permission catalog loaded once at process start.
//!
//! The catalog is immutable after construction and is shared behind an
//! `Arc`. Every replace-set on role grants validates against it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use wqp_core::{AppError, AppResult};

use crate::{Permission, PermissionId, RoleName};

const BUILTIN_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("user_view", "View users", "user_management"),
    ("user_create", "Create users", "user_management"),
    ("user_edit", "Edit users", "user_management"),
    ("user_delete", "Delete users", "user_management"),
    ("data_view", "View data", "data_management"),
    ("data_upload", "Upload data", "data_management"),
    ("data_download", "Download data", "data_management"),
    ("data_delete", "Delete data", "data_management"),
    ("device_view", "View devices", "device_management"),
    ("device_control", "Control devices", "device_management"),
    ("device_config", "Configure devices", "device_management"),
    ("report_view", "View reports", "report_management"),
    ("report_create", "Create reports", "report_management"),
    ("report_export", "Export reports", "report_management"),
    ("system_config", "System configuration", "system_management"),
    ("system_monitor", "System monitoring", "system_management"),
    ("role_manage", "Manage roles", "system_management"),
];

/// Grants seeded for default roles. `None` grants every catalog entry.
const DEFAULT_ROLE_GRANTS: &[(&str, &str, Option<&[&str]>)] = &[
    ("admin", "Full administrative access", None),
    (
        "manager",
        "Manages monitoring data",
        Some(&[
            "data_view",
            "data_upload",
            "data_download",
            "data_delete",
            "report_view",
        ]),
    ),
    (
        "operator",
        "Operates field devices",
        Some(&["device_view", "device_control", "data_view"]),
    ),
    (
        "analyst",
        "Analyses data and builds reports",
        Some(&[
            "data_view",
            "data_download",
            "report_view",
            "report_create",
            "report_export",
        ]),
    ),
    (
        "viewer",
        "Read-only dashboard access",
        Some(&["data_view", "report_view", "device_view"]),
    ),
    ("user", "Baseline access", Some(&["data_view", "report_view"])),
];

/// A default role with the grants it receives when first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrantSeed {
    /// Role name.
    pub role_name: RoleName,
    /// Role description.
    pub description: String,
    /// Grants restricted to ids present in the catalog.
    pub permission_ids: Vec<PermissionId>,
}

/// Immutable set of grantable permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    entries: BTreeMap<PermissionId, Permission>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogEntryDocument {
    id: String,
    name: String,
    category: String,
}

impl PermissionCatalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> AppResult<Self> {
        let mut entries = BTreeMap::new();

        for permission in permissions {
            let id = permission.id.clone();
            if entries.insert(id.clone(), permission).is_some() {
                return Err(AppError::Validation(format!(
                    "permission catalog contains duplicate id '{id}'"
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Returns the built-in catalog.
    pub fn builtin() -> AppResult<Self> {
        Self::new(
            BUILTIN_PERMISSIONS
                .iter()
                .map(|(id, name, category)| Permission::new(*id, *name, *category))
                .collect::<AppResult<Vec<_>>>()?,
        )
    }

    /// Parses a JSON array of `{ "id", "name", "category" }` objects.
    pub fn from_json(document: &str) -> AppResult<Self> {
        let entries = serde_json::from_str::<Vec<CatalogEntryDocument>>(document).map_err(
            |error| AppError::Validation(format!("invalid permission catalog document: {error}")),
        )?;

        Self::new(
            entries
                .into_iter()
                .map(|entry| Permission::new(entry.id, entry.name, entry.category))
                .collect::<AppResult<Vec<_>>>()?,
        )
    }

    /// Returns the permission with the given id.
    #[must_use]
    pub fn get(&self, id: &PermissionId) -> Option<&Permission> {
        self.entries.get(id)
    }

    /// Returns whether the catalog defines the id.
    #[must_use]
    pub fn contains(&self, id: &PermissionId) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates permissions ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.entries.values()
    }

    /// Returns the number of catalog entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups permissions by category.
    #[must_use]
    pub fn categories(&self) -> BTreeMap<&str, Vec<&Permission>> {
        let mut grouped: BTreeMap<&str, Vec<&Permission>> = BTreeMap::new();
        for permission in self.entries.values() {
            grouped
                .entry(permission.category.as_str())
                .or_default()
                .push(permission);
        }
        grouped
    }

    /// Returns the ids the catalog does not define, deduplicated.
    #[must_use]
    pub fn unknown_ids<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a PermissionId>,
    ) -> BTreeSet<&'a PermissionId> {
        ids.into_iter().filter(|id| !self.contains(id)).collect()
    }

    /// Returns the default roles and their grants restricted to this catalog.
    pub fn default_role_grants(&self) -> AppResult<Vec<RoleGrantSeed>> {
        DEFAULT_ROLE_GRANTS
            .iter()
            .map(|(role_name, description, grants)| {
                let permission_ids = match grants {
                    None => self.entries.keys().cloned().collect(),
                    Some(ids) => ids
                        .iter()
                        .map(|id| PermissionId::new(*id))
                        .collect::<AppResult<Vec<_>>>()?
                        .into_iter()
                        .filter(|id| self.contains(id))
                        .collect(),
                };

                Ok(RoleGrantSeed {
                    role_name: RoleName::new(*role_name)?,
                    description: (*description).to_owned(),
                    permission_ids,
                })
            })
            .collect()
    }
}
