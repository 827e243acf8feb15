mod common;
mod roles;
mod users;

pub use common::{HealthResponse, PermissionResponse};
pub use roles::{
    ProvisionRoleRequest, ReplaceRoleMembersRequest, ReplaceRolePermissionsRequest,
    ReviseRoleRequest, RoleDetailResponse, RoleResponse,
};
pub use users::{
    AuthorizationSnapshotResponse, BatchRegistrationResponse, BatchRowErrorResponse,
    RegisterUserRequest, UpdateUserRequest, UserResponse, UserSummaryResponse,
};

#[cfg(test)]
mod tests {
    use super::{
        AuthorizationSnapshotResponse, BatchRegistrationResponse, BatchRowErrorResponse,
        HealthResponse, PermissionResponse, ProvisionRoleRequest,
        RegisterUserRequest, ReplaceRoleMembersRequest, ReplaceRolePermissionsRequest,
        ReviseRoleRequest, RoleDetailResponse, RoleResponse, UpdateUserRequest, UserResponse,
        UserSummaryResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        ProvisionRoleRequest::export(&config)?;
        ReviseRoleRequest::export(&config)?;
        ReplaceRoleMembersRequest::export(&config)?;
        ReplaceRolePermissionsRequest::export(&config)?;
        RegisterUserRequest::export(&config)?;
        UpdateUserRequest::export(&config)?;
        RoleResponse::export(&config)?;
        RoleDetailResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        UserResponse::export(&config)?;
        UserSummaryResponse::export(&config)?;
        AuthorizationSnapshotResponse::export(&config)?;
        BatchRegistrationResponse::export(&config)?;
        BatchRowErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn request_bodies_reject_unknown_fields() {
        let members = serde_json::from_str::<ReplaceRoleMembersRequest>(
            r#"{"user_ids":[],"role_ids":[]}"#,
        );
        assert!(members.is_err());

        let register = serde_json::from_str::<RegisterUserRequest>(
            r#"{"username":"alice","password":"river-sample-42","is_admin":true}"#,
        );
        assert!(register.is_err());
    }
}
