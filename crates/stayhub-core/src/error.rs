//! Error taxonomy for StayHub services.
//!
//! Every service operation returns [`ServiceResult`]. The gateway maps each
//! variant onto an HTTP status; repositories report failures as
//! `anyhow::Error`, which surfaces here as [`ServiceError::Upstream`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing, malformed, expired or revoked credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but not allowed to touch the resource.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Business-rule violation: double booking, already cancelled, duplicate email.
    #[error("{0}")]
    Conflict(String),

    /// Request is well-formed but semantically invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// Data store or identity provider failure not otherwise classified.
    #[error("{0}")]
    Upstream(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Short machine-readable name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Upstream(_) => "upstream",
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
