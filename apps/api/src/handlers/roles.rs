use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use wqp_domain::RoleId;

use crate::dto::{
    PermissionResponse, ProvisionRoleRequest, ReplaceRoleMembersRequest,
    ReplaceRolePermissionsRequest, ReviseRoleRequest, RoleDetailResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleDetailResponse>>> {
    let roles = state
        .rbac_service
        .roles_with_detail()
        .await?
        .into_iter()
        .map(RoleDetailResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn provision_role_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProvisionRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleDetailResponse>)> {
    let detail = state
        .rbac_service
        .provision_role(payload.into_input()?)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleDetailResponse::from(detail))))
}

pub async fn role_detail_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleDetailResponse>> {
    let role_id = RoleId::parse(role_id.as_str())?;
    let detail = state.rbac_service.role_detail(role_id).await?;

    Ok(Json(RoleDetailResponse::from(detail)))
}

pub async fn revise_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    ApiJson(payload): ApiJson<ReviseRoleRequest>,
) -> ApiResult<Json<RoleDetailResponse>> {
    let role_id = RoleId::parse(role_id.as_str())?;
    let detail = state
        .rbac_service
        .revise_role(role_id, payload.into_input()?)
        .await?;

    Ok(Json(RoleDetailResponse::from(detail)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    let role_id = RoleId::parse(role_id.as_str())?;
    state.rbac_service.delete_role(role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_role_members_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    ApiJson(payload): ApiJson<ReplaceRoleMembersRequest>,
) -> ApiResult<Json<RoleDetailResponse>> {
    let role_id = RoleId::parse(role_id.as_str())?;
    state
        .rbac_service
        .replace_role_members(role_id, payload.into_user_ids()?)
        .await?;
    let detail = state.rbac_service.role_detail(role_id).await?;

    Ok(Json(RoleDetailResponse::from(detail)))
}

pub async fn role_permissions_handler(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .rbac_service
        .effective_permissions_for_role(role_name.as_str())
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn replace_role_permissions_handler(
    State(state): State<AppState>,
    Path(role_name): Path<String>,
    ApiJson(payload): ApiJson<ReplaceRolePermissionsRequest>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    state
        .rbac_service
        .replace_role_permissions(role_name.as_str(), payload.into_permission_ids()?)
        .await?;

    role_permissions_handler(State(state), Path(role_name)).await
}
