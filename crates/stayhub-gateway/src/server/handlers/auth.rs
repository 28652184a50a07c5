//! `/auth` handlers (public)

use axum::{extract::State, http::StatusCode, response::Json};

use crate::api::{ApiJson, ApiResult, AuthResponse, LoginRequest, RegisterRequest};
use crate::server::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (user, token) = state
        .identity
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: Some("User registered successfully"),
            user: user.into(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (user, token) = state
        .identity
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        message: None,
        user: user.into(),
        token,
    }))
}
