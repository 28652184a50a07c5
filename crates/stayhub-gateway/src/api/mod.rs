//! Request/response schemas
//!
//! The single place where domain types are mapped to the wire format.
//! Field names are camelCase, except the legacy `host_id`/`created_at`
//! keys that property payloads have always carried.

mod auth;
mod bookings;
mod error;
mod properties;
mod users;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use bookings::{
    BookingDetailResponse, BookingMutationResponse, BookingPropertyResponse, BookingResponse,
    BookingSummaryResponse, CreateBookingRequest, PropertySummaryResponse,
};
pub use error::{status_for, ApiError, ApiResult, ErrorBody};
pub use properties::{
    CreatePropertyRequest, CreatePropertyResponse, CreateRoomRequest, PaginationResponse,
    PropertyDetailResponse, PropertyListQuery, PropertyListResponse, PropertyResponse,
    ReviewResponse, ReviewerResponse, RoomResponse, UpdatePropertyRequest,
    UpdatePropertyResponse,
};
pub use users::{ChangePasswordRequest, ProfileUpdatedResponse, UpdateProfileRequest, UserResponse};

use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer, Serialize};

/// JSON body extractor whose rejections render as `{ "error": ... }`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Query string extractor whose rejections render as `{ "error": ... }`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor whose rejections render as `{ "error": ... }`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `{ "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Lenient deserializers for dates and query values.
pub(crate) mod de {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use serde::de::Error;
    use std::str::FromStr;

    /// Accepts `YYYY-MM-DD` or a full ISO-8601 timestamp, keeping the date part.
    /// Years stay within 1..=9999 so every date round-trips through the
    /// four-digit storage format.
    pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .ok()
            .filter(|date| (1..=9999).contains(&date.year()))
            .ok_or_else(|| format!("Invalid date: {}", raw))
    }

    pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(D::Error::custom)
    }

    /// Query values where an empty string means "not provided".
    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(D::Error::custom),
        }
    }

    pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date(&raw).map(Some).map_err(D::Error::custom),
        }
    }

}
