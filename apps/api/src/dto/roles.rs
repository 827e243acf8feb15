use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{PermissionResponse, UserSummaryResponse};

mod conversions;

/// Incoming payload for creating a role with optional grants and members.
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/provision-role-request.ts"
)]
pub struct ProvisionRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Option<Vec<String>>,
    #[serde(default)]
    pub user_ids: Option<Vec<String>>,
}

/// Incoming payload for updating a role and optionally replacing its sets.
///
/// Omitted sets are left unchanged. An empty array clears the set.
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/revise-role-request.ts"
)]
pub struct ReviseRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Option<Vec<String>>,
    #[serde(default)]
    pub user_ids: Option<Vec<String>>,
}

/// Incoming payload replacing every member of a role.
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/replace-role-members-request.ts"
)]
pub struct ReplaceRoleMembersRequest {
    pub user_ids: Vec<String>,
}

/// Incoming payload replacing every grant stored under a role name.
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/replace-role-permissions-request.ts"
)]
pub struct ReplaceRolePermissionsRequest {
    pub permission_ids: Vec<String>,
}

/// API representation of a role row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

/// API representation of a role with its members and effective grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-detail-response.ts"
)]
pub struct RoleDetailResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub members: Vec<UserSummaryResponse>,
    pub permissions: Vec<PermissionResponse>,
}
