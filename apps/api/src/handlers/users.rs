use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use wqp_domain::UserId;

use crate::dto::{
    AuthorizationSnapshotResponse, BatchRegistrationResponse, PermissionResponse,
    RegisterUserRequest, RoleResponse, UpdateUserRequest, UserResponse, UserSummaryResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserSummaryResponse>>> {
    let users = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(UserSummaryResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn register_user_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.register_user(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn batch_register_users_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Vec<RegisterUserRequest>>,
) -> ApiResult<(StatusCode, Json<BatchRegistrationResponse>)> {
    let report = state
        .user_service
        .register_users(payload.into_iter().map(Into::into).collect())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BatchRegistrationResponse::from(report)),
    ))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let user = state.user_service.get_user(user_id).await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let user = state
        .user_service
        .update_user(user_id, payload.into())
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::parse(user_id.as_str())?;
    state.user_service.delete_user(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let roles = state
        .rbac_service
        .roles_for_user(user_id)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let permissions = state
        .authorization_service
        .permissions_for_user(user_id)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn authorization_snapshot_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<AuthorizationSnapshotResponse>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let snapshot = state
        .authorization_service
        .authorization_snapshot(user_id)
        .await?;

    Ok(Json(AuthorizationSnapshotResponse::from(snapshot)))
}
