use wqp_domain::RoleName;

/// Validated payload for inserting a role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoleRecord {
    /// Unique role name.
    pub name: RoleName,
    /// Free-form description.
    pub description: String,
}

/// Validated payload for updating a role row in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecordUpdate {
    /// New role name. May equal the current name.
    pub name: RoleName,
    /// New description.
    pub description: String,
}

/// Outcome of reconciling stored permission rows with the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSyncReport {
    /// Catalog entries inserted or refreshed.
    pub upserted: usize,
    /// Stored entries removed because the catalog no longer defines them.
    pub pruned: usize,
}
