//! Trace Context - request correlation
//!
//! Generates trace ids and the span every request runs inside.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::{info, info_span, warn, Span};

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Short trace id, 6 hex characters (e.g. "a1b2c3")
pub fn generate_trace_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    let mixed = counter.wrapping_add(timestamp);
    format!("{:06x}", mixed & 0xFFFFFF)
}

/// Correlation data for one HTTP request
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
    pub method: String,
    pub path: String,
    /// Query string, if any (never logged for sensitive paths)
    pub query: Option<String>,
    pub started_at: Instant,
}

impl TraceContext {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            trace_id: generate_trace_id(),
            method: method.to_string(),
            path: path.to_string(),
            query: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(String::from);
        self
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Span and entry/exit lines for a request
pub struct RequestSpan;

impl RequestSpan {
    /// Every log emitted while handling the request inherits `trace_id`
    pub fn enter(ctx: &TraceContext) -> Span {
        info_span!(
            "request",
            trace_id = %ctx.trace_id,
            method = %ctx.method,
            path = %ctx.path,
        )
    }

    pub fn log_entry(ctx: &TraceContext) {
        match ctx.query.as_deref() {
            Some(q) => info!(trace_id = %ctx.trace_id, "→ {} {}?{}", ctx.method, ctx.path, q),
            None => info!(trace_id = %ctx.trace_id, "→ {} {}", ctx.method, ctx.path),
        }
    }

    /// Server errors are logged at warn so they stand out
    pub fn log_exit(ctx: &TraceContext, status: u16) {
        let elapsed = ctx.elapsed_ms();
        if status >= 500 {
            warn!(trace_id = %ctx.trace_id, "← {} ({}ms)", status, elapsed);
        } else {
            info!(trace_id = %ctx.trace_id, "← {} ({}ms)", status, elapsed);
        }
    }
}
