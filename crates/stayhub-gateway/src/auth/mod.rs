//! Access gate
//!
//! Validates the bearer token on every protected request and attaches the
//! resolved [`Caller`] to the request extensions. Nothing is cached: each
//! request re-validates the token and re-reads the user.

mod identity;
mod token;

pub use identity::{Authenticator, IdentityService, MIN_PASSWORD_LEN};
pub use token::{
    TokenClaims, TokenError, TokenSigner, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS,
};

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use stayhub_core::{Caller, ServiceError};
use tracing::{debug, warn};

use crate::api::ApiError;

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware for protected routes
pub async fn require_auth(
    State(authenticator): State<Arc<dyn Authenticator>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // CORS preflight carries no credentials
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        debug!("[Auth] Missing bearer token");
        return ApiError::unauthorized("Access token required").into_response();
    };

    match authenticator.authenticate(token).await {
        Ok(caller) => {
            debug!(user_id = %caller.user_id, role = %caller.role, "[Auth] Authenticated");
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(err) => {
            if matches!(err, ServiceError::Upstream(_)) {
                warn!("[Auth] Authentication failed upstream: {}", err);
            }
            ApiError::from(err).into_response()
        }
    }
}

/// The authenticated caller. Only usable behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentCaller(pub Caller);

impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(CurrentCaller)
            .ok_or_else(|| ApiError::unauthorized("Access token required"))
    }
}

/// An authenticated caller holding the admin role
#[derive(Debug, Clone)]
pub struct AdminCaller(pub Caller);

impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentCaller(caller) = CurrentCaller::from_request_parts(parts, state).await?;
        caller.require_admin()?;
        Ok(AdminCaller(caller))
    }
}
