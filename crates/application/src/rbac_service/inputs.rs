use wqp_domain::{Permission, PermissionId, Role, UserId, UserSummary};

/// Input payload for creating a bare role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique, case-sensitive role name.
    pub name: String,
    /// Optional description. Defaults to empty.
    pub description: Option<String>,
}

/// Input payload for updating a role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name.
    pub name: String,
    /// New description. `None` keeps the current one.
    pub description: Option<String>,
}

/// Input payload for creating a role with its initial grants and members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRoleInput {
    /// Unique, case-sensitive role name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Grants to attach. `None` leaves the role without grants.
    pub permission_ids: Option<Vec<PermissionId>>,
    /// Members to attach. `None` leaves the role without members.
    pub user_ids: Option<Vec<UserId>>,
}

/// Input payload for updating a role and optionally replacing its sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseRoleInput {
    /// New role name.
    pub name: String,
    /// New description. `None` keeps the current one.
    pub description: Option<String>,
    /// Replacement grants. `None` leaves grants untouched.
    pub permission_ids: Option<Vec<PermissionId>>,
    /// Replacement members. `None` leaves members untouched.
    pub user_ids: Option<Vec<UserId>>,
}

/// Role with its current members and grants attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetail {
    /// Role row.
    pub role: Role,
    /// Current members.
    pub members: Vec<UserSummary>,
    /// Grants stored under the role's current name.
    pub permissions: Vec<Permission>,
}

impl RoleDetail {
    /// Returns member identifiers in listing order.
    #[must_use]
    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|member| member.id).collect()
    }

    /// Returns granted permission identifiers in listing order.
    #[must_use]
    pub fn permission_ids(&self) -> Vec<PermissionId> {
        self.permissions
            .iter()
            .map(|permission| permission.id.clone())
            .collect()
    }
}
