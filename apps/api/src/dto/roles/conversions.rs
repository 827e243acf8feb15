use wqp_application::{ProvisionRoleInput, ReviseRoleInput, RoleDetail};
use wqp_core::AppResult;
use wqp_domain::{PermissionId, Role, UserId};

use super::{
    PermissionResponse, ProvisionRoleRequest, ReplaceRoleMembersRequest,
    ReplaceRolePermissionsRequest, ReviseRoleRequest, RoleDetailResponse, RoleResponse,
    UserSummaryResponse,
};

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.into(),
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<RoleDetail> for RoleDetailResponse {
    fn from(value: RoleDetail) -> Self {
        let role = RoleResponse::from(value.role);
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            created_at: role.created_at,
            members: value
                .members
                .into_iter()
                .map(UserSummaryResponse::from)
                .collect(),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}

impl ProvisionRoleRequest {
    pub fn into_input(self) -> AppResult<ProvisionRoleInput> {
        Ok(ProvisionRoleInput {
            name: self.name,
            description: self.description,
            permission_ids: self.permission_ids.map(parse_permission_ids).transpose()?,
            user_ids: self.user_ids.map(parse_user_ids).transpose()?,
        })
    }
}

impl ReviseRoleRequest {
    pub fn into_input(self) -> AppResult<ReviseRoleInput> {
        Ok(ReviseRoleInput {
            name: self.name,
            description: self.description,
            permission_ids: self.permission_ids.map(parse_permission_ids).transpose()?,
            user_ids: self.user_ids.map(parse_user_ids).transpose()?,
        })
    }
}

impl ReplaceRoleMembersRequest {
    pub fn into_user_ids(self) -> AppResult<Vec<UserId>> {
        parse_user_ids(self.user_ids)
    }
}

impl ReplaceRolePermissionsRequest {
    pub fn into_permission_ids(self) -> AppResult<Vec<PermissionId>> {
        parse_permission_ids(self.permission_ids)
    }
}

fn parse_permission_ids(values: Vec<String>) -> AppResult<Vec<PermissionId>> {
    values.into_iter().map(PermissionId::new).collect()
}

fn parse_user_ids(values: Vec<String>) -> AppResult<Vec<UserId>> {
    values
        .iter()
        .map(|value| UserId::parse(value.as_str()))
        .collect()
}
