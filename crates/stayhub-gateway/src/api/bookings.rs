//! Booking payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stayhub_core::{
    Booking, BookingDetail, BookingStatus, BookingWithProperty, NewBooking, PropertySummary,
};

use super::de;
use super::properties::RoomResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub property_id: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(deserialize_with = "de::date")]
    pub check_in_date: NaiveDate,
    #[serde(deserialize_with = "de::date")]
    pub check_out_date: NaiveDate,
    pub guests: i64,
    #[serde(default)]
    pub total_price: Option<f64>,
}

impl From<CreateBookingRequest> for NewBooking {
    fn from(req: CreateBookingRequest) -> Self {
        NewBooking {
            property_id: req.property_id,
            // An empty room id means "whole property"
            room_id: req.room_id.filter(|id| !id.is_empty()),
            check_in: req.check_in_date,
            check_out: req.check_out_date,
            guests: req.guests,
            total_price: req.total_price,
        }
    }
}

/// A booking as stored
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub property_id: String,
    pub room_id: Option<String>,
    pub user_id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i64,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Booking> for BookingResponse {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id.clone(),
            property_id: b.property_id.clone(),
            room_id: b.room_id.clone(),
            user_id: b.user_id.clone(),
            check_in_date: b.check_in_date,
            check_out_date: b.check_out_date,
            guests: b.guests,
            total_price: b.total_price,
            status: b.status,
            created_at: b.created_at,
        }
    }
}

/// Response of create and cancel
#[derive(Debug, Serialize)]
pub struct BookingMutationResponse {
    pub message: &'static str,
    pub booking: BookingResponse,
}

impl BookingMutationResponse {
    pub fn created(booking: &Booking) -> Self {
        Self {
            message: "Booking created successfully",
            booking: booking.into(),
        }
    }

    pub fn cancelled(booking: &Booking) -> Self {
        Self {
            message: "Booking cancelled successfully",
            booking: booking.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PropertySummaryResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: String,
    pub country: String,
    pub image: Option<String>,
}

impl From<PropertySummary> for PropertySummaryResponse {
    fn from(p: PropertySummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
            location: p.location,
            city: p.city,
            country: p.country,
            image: p.image,
        }
    }
}

/// One entry of "my bookings"
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummaryResponse {
    pub id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i64,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub property: PropertySummaryResponse,
}

impl From<BookingWithProperty> for BookingSummaryResponse {
    fn from(item: BookingWithProperty) -> Self {
        let b = item.booking;
        Self {
            id: b.id,
            check_in_date: b.check_in_date,
            check_out_date: b.check_out_date,
            guests: b.guests,
            total_price: b.total_price,
            status: b.status,
            created_at: b.created_at,
            property: item.property.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPropertyResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub country: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub price_per_night: f64,
    pub images: Vec<String>,
    pub rooms: Vec<RoomResponse>,
}

/// A single booking with its property
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailResponse {
    pub id: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i64,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub property: BookingPropertyResponse,
}

impl From<BookingDetail> for BookingDetailResponse {
    fn from(detail: BookingDetail) -> Self {
        let b = detail.booking;
        let p = detail.property.property;
        Self {
            id: b.id,
            check_in_date: b.check_in_date,
            check_out_date: b.check_out_date,
            guests: b.guests,
            total_price: b.total_price,
            status: b.status,
            created_at: b.created_at,
            property: BookingPropertyResponse {
                id: p.id,
                name: p.name,
                description: p.description,
                location: p.location,
                city: p.city,
                country: p.country,
                property_type: p.property_type,
                price_per_night: p.price_per_night,
                images: p.images,
                rooms: detail.property.rooms.into_iter().map(RoomResponse::from).collect(),
            },
        }
    }
}
