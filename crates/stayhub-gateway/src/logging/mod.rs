//! Request logging
//!
//! Short trace ids per request and a single entry/exit line, so a request
//! can be followed through the logs without repeating the same fields.

mod trace_context;

pub use trace_context::{generate_trace_id, RequestSpan, TraceContext};
