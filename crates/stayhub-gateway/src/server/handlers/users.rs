//! `/users` handlers

use axum::{extract::State, response::Json};

use crate::api::{
    ApiJson, ApiResult, ChangePasswordRequest, MessageResponse, ProfileUpdatedResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::auth::CurrentCaller;
use crate::server::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.profile(&caller).await?;
    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    let user = state.users.update_profile(&caller, request.into()).await?;
    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully",
        user: user.into(),
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .identity
        .change_password(&caller, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}
