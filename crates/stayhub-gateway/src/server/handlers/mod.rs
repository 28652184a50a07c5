//! HTTP handlers for the REST API

pub mod auth;
pub mod bookings;
pub mod properties;
pub mod users;

use axum::response::Json;
use tracing::debug;

use crate::api::HealthResponse;

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
    })
}
