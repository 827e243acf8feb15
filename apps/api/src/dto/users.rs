use serde::{Deserialize, Serialize};
use ts_rs::TS;
use wqp_application::{
    AuthorizationSnapshot, BatchRegistrationReport, BatchRowFailure, RegisterUserInput,
    UpdateUserInput,
};
use wqp_domain::{User, UserSummary};

use super::{PermissionResponse, RoleResponse};

/// Incoming payload for user registration.
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/register-user-request.ts"
)]
pub struct RegisterUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role_label: Option<String>,
}

impl From<RegisterUserRequest> for RegisterUserInput {
    fn from(value: RegisterUserRequest) -> Self {
        Self {
            username: value.username,
            email: value.email,
            password: value.password,
            role_label: value.role_label,
        }
    }
}

/// Incoming payload for user updates.
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role_label: String,
}

impl From<UpdateUserRequest> for UpdateUserInput {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            username: value.username,
            email: value.email,
            role_label: value.role_label,
        }
    }
}

/// API representation of a user. Credential material is never exposed.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role_label: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username.into(),
            email: value.email.map(String::from),
            role_label: value.role_label,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Compact user projection used in role and listing payloads.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-summary-response.ts"
)]
pub struct UserSummaryResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role_label: String,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(value: UserSummary) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
            email: value.email,
            role_label: value.role_label,
        }
    }
}

/// Roles and effective permissions of one user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/authorization-snapshot-response.ts"
)]
pub struct AuthorizationSnapshotResponse {
    pub user: UserSummaryResponse,
    pub roles: Vec<RoleResponse>,
    pub permissions: Vec<PermissionResponse>,
    pub policy: String,
}

impl From<AuthorizationSnapshot> for AuthorizationSnapshotResponse {
    fn from(value: AuthorizationSnapshot) -> Self {
        Self {
            user: UserSummaryResponse::from(value.user),
            roles: value.roles.into_iter().map(RoleResponse::from).collect(),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
            policy: value.policy.as_str().to_owned(),
        }
    }
}

/// Row skipped by a batch registration.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/batch-row-error-response.ts"
)]
pub struct BatchRowErrorResponse {
    pub row: usize,
    pub username: String,
    pub message: String,
}

impl From<BatchRowFailure> for BatchRowErrorResponse {
    fn from(value: BatchRowFailure) -> Self {
        Self {
            row: value.row,
            username: value.username,
            message: value.reason,
        }
    }
}

/// Outcome of `POST /api/users/batch-create`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/batch-registration-response.ts"
)]
pub struct BatchRegistrationResponse {
    pub created_count: usize,
    pub failed_count: usize,
    pub created: Vec<UserResponse>,
    pub errors: Vec<BatchRowErrorResponse>,
}

impl From<BatchRegistrationReport> for BatchRegistrationResponse {
    fn from(value: BatchRegistrationReport) -> Self {
        Self {
            created_count: value.created.len(),
            failed_count: value.failures.len(),
            created: value.created.into_iter().map(UserResponse::from).collect(),
            errors: value
                .failures
                .into_iter()
                .map(BatchRowErrorResponse::from)
                .collect(),
        }
    }
}
