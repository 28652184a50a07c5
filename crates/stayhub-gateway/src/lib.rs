//! StayHub Gateway
//!
//! REST API server that provides:
//! - Bearer-token authentication backed by a local identity provider
//! - Catalogue, booking and profile endpoints under `/api`
//! - Request logging with trace ids and rate limiting on login/register
//! - Dependency Injection so the same router runs on SQLite or in-memory stores

pub mod api;
pub mod auth;
pub mod logging;
pub mod server;

pub use api::{ApiError, ApiResult, ErrorBody};
pub use auth::{Authenticator, IdentityService, TokenSigner};
pub use server::{
    build_router, AppDependencies, AppState, DependenciesBuilder, ServerConfig, StayHubServer,
    DEFAULT_PORT,
};
