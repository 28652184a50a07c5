//! Booking entity, its status machine and the stay-date overlap rule

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Property, PropertyDetail};
use crate::error::{ServiceError, ServiceResult};

/// Booking lifecycle: `Confirmed` at creation, `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(anyhow::anyhow!("Unknown booking status: {}", other)),
        }
    }
}

/// A check-in/check-out pair with check-out strictly after check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> ServiceResult<Self> {
        if check_out <= check_in {
            return Err(ServiceError::invalid(
                "Check-out date must be after check-in date",
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Inclusive on both ends: a check-out on day N collides with a
    /// check-in on day N, so same-day turnover is not allowed.
    pub fn overlaps(&self, other: &StayDates) -> bool {
        ranges_overlap(self.check_in, self.check_out, other.check_in, other.check_out)
    }
}

/// `existing.check_in <= requested.check_out AND existing.check_out >= requested.check_in`
pub fn ranges_overlap(
    existing_in: NaiveDate,
    existing_out: NaiveDate,
    requested_in: NaiveDate,
    requested_out: NaiveDate,
) -> bool {
    existing_in <= requested_out && existing_out >= requested_in
}

/// Nights × nightly rate, rounded to cents.
pub fn quote_total(dates: &StayDates, nightly_rate: f64) -> f64 {
    ((dates.nights() as f64) * nightly_rate * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: String,

    pub property_id: String,

    pub room_id: Option<String>,

    /// Owning user
    pub user_id: String,

    pub check_in_date: NaiveDate,

    pub check_out_date: NaiveDate,

    pub guests: i64,

    pub total_price: f64,

    pub status: BookingStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new confirmed booking
    pub fn new(
        property_id: impl Into<String>,
        user_id: impl Into<String>,
        dates: StayDates,
        guests: i64,
        total_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            property_id: property_id.into(),
            room_id: None,
            user_id: user_id.into(),
            check_in_date: dates.check_in(),
            check_out_date: dates.check_out(),
            guests,
            total_price,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    /// Attach a room
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    /// The only permitted transition, `confirmed -> cancelled`
    pub fn cancel(&mut self) -> ServiceResult<()> {
        match self.status {
            BookingStatus::Confirmed => {
                self.status = BookingStatus::Cancelled;
                Ok(())
            }
            BookingStatus::Cancelled => {
                Err(ServiceError::conflict("Booking is already cancelled"))
            }
        }
    }

    /// Whether this booking blocks `dates` on its property
    pub fn blocks(&self, dates: &StayDates) -> bool {
        self.is_confirmed()
            && ranges_overlap(
                self.check_in_date,
                self.check_out_date,
                dates.check_in(),
                dates.check_out(),
            )
    }
}

/// Create-booking input. `total_price`, when given, must match the quote.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub property_id: String,
    pub room_id: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
    pub total_price: Option<f64>,
}

/// Property fields shown next to each of "my bookings".
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySummary {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: String,
    pub country: String,
    /// First image url
    pub image: Option<String>,
}

impl From<&Property> for PropertySummary {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            location: p.location.clone(),
            city: p.city.clone(),
            country: p.country.clone(),
            image: p.cover_image().map(String::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingWithProperty {
    pub booking: Booking,
    pub property: PropertySummary,
}

/// Booking joined with its full property (rooms and images).
#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub booking: Booking,
    pub property: PropertyDetail,
}

/// "My bookings" order: check-in descending, then id ascending.
pub fn sort_for_listing(bookings: &mut [BookingWithProperty]) {
    bookings.sort_by(|a, b| {
        b.booking
            .check_in_date
            .cmp(&a.booking.check_in_date)
            .then_with(|| a.booking.id.cmp(&b.booking.id))
    });
}
