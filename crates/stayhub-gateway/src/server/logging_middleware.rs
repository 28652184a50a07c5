//! HTTP request/response logging middleware
//!
//! One entry line and one exit line per request, tagged with a trace id.
//! Bodies are logged at DEBUG, with credentials redacted. Request bodies are
//! buffered up to [`MAX_REQUEST_BODY_SIZE`]; anything larger is refused.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tracing::{debug, warn, Instrument};

use crate::api::ApiError;
use crate::logging::{RequestSpan, TraceContext};

/// Largest request body the gateway will buffer
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Bodies larger than this are summarised by size
const MAX_BODY_LOG_SIZE: usize = 1024 * 1024;

/// Response bodies are only logged when smaller than this
const MAX_RESPONSE_LOG_SIZE: usize = 1000;

/// Paths whose bodies carry passwords or tokens
const SENSITIVE_PATHS: &[&str] = &["/auth/login", "/auth/register", "/users/change-password"];

pub fn is_sensitive_path(path: &str) -> bool {
    SENSITIVE_PATHS.iter().any(|p| path.contains(p))
}

/// Compact one-line rendering of a body
pub fn format_body(bytes: &[u8], redact: bool) -> String {
    if redact {
        return "[REDACTED]".to_string();
    }

    if bytes.is_empty() {
        return "[empty]".to_string();
    }

    if bytes.len() > MAX_BODY_LOG_SIZE {
        return format!("[{} bytes]", bytes.len());
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(text) {
                return serde_json::to_string(&json).unwrap_or_else(|_| text.to_string());
            }
            if text.chars().count() > 200 {
                let truncated: String = text.chars().take(200).collect();
                format!("{}...", truncated)
            } else {
                text.to_string()
            }
        }
        Err(_) => format!("[binary: {} bytes]", bytes.len()),
    }
}

/// Logging middleware for requests and responses
pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let is_sensitive = is_sensitive_path(&path);
    let query = if is_sensitive { None } else { request.uri().query() };
    let ctx = TraceContext::new(request.method().as_str(), &path).with_query(query);

    let span = RequestSpan::enter(&ctx);

    async move {
        RequestSpan::log_entry(&ctx);

        let (parts, body) = request.into_parts();
        let body_bytes = match Limited::new(body, MAX_REQUEST_BODY_SIZE).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(trace_id = %ctx.trace_id, "Request body exceeds {} bytes", MAX_REQUEST_BODY_SIZE);
                RequestSpan::log_exit(&ctx, StatusCode::PAYLOAD_TOO_LARGE.as_u16());
                return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
                    .into_response();
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, "Failed to read request body: {}", e);
                RequestSpan::log_exit(&ctx, StatusCode::BAD_REQUEST.as_u16());
                return ApiError::bad_request("Failed to read request body").into_response();
            }
        };

        if !body_bytes.is_empty() {
            debug!(
                trace_id = %ctx.trace_id,
                body = %format_body(&body_bytes, is_sensitive),
                "Request body"
            );
        }

        let mut request = Request::from_parts(parts, Body::from(body_bytes));
        request.extensions_mut().insert(ctx.clone());

        let response = next.run(request).await;

        let (parts, body) = response.into_parts();
        let status = parts.status;

        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, "Failed to read response body: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        if !body_bytes.is_empty() && body_bytes.len() < MAX_RESPONSE_LOG_SIZE {
            debug!(
                trace_id = %ctx.trace_id,
                body = %format_body(&body_bytes, is_sensitive),
                "Response body"
            );
        }

        RequestSpan::log_exit(&ctx, status.as_u16());

        Response::from_parts(parts, Body::from(body_bytes))
    }
    .instrument(span)
    .await
}
