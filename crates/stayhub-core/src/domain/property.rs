//! Property entity, listing filters and pagination

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NewRoom, Review, Room, StayDates};
use crate::error::{ServiceError, ServiceResult};

/// Amenity catalogue seeded by the initial migration.
pub const DEFAULT_AMENITIES: &[&str] = &[
    "WiFi",
    "Pool",
    "Kitchen",
    "Free parking",
    "Air conditioning",
    "Washer",
    "Gym",
    "Breakfast",
    "Pet friendly",
    "Hot tub",
];

/// A listed property owned by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// Free-form location (neighbourhood, street)
    pub location: String,

    pub city: String,

    pub country: String,

    /// Property type, e.g. "hotel", "apartment", "villa"
    pub property_type: String,

    pub price_per_night: f64,

    /// Average rating, 0–5
    pub rating: f64,

    pub review_count: i64,

    pub max_guests: i64,

    pub bedrooms: i64,

    pub beds: i64,

    pub bathrooms: i64,

    /// Owning user
    pub host_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Image urls, in display order
    pub images: Vec<String>,

    /// Linked amenity names
    pub amenities: Vec<String>,
}

impl Property {
    /// Build a fresh listing for `host_id`. Rating and review count start at zero.
    pub fn new(host_id: impl Into<String>, input: &NewProperty) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            location: input.location.clone(),
            city: input.city.clone(),
            country: input.country.clone(),
            property_type: input.property_type.clone(),
            price_per_night: input.price_per_night,
            rating: 0.0,
            review_count: 0,
            max_guests: input.max_guests,
            bedrooms: input.bedrooms,
            beds: input.beds,
            bathrooms: input.bathrooms,
            host_id: host_id.into(),
            created_at: Utc::now(),
            images: input.images.clone(),
            amenities: input.amenities.clone(),
        }
    }

    /// Apply a partial update of the scalar fields
    pub fn apply(&mut self, changes: PropertyChanges) {
        if let Some(v) = changes.name {
            self.name = v;
        }
        if let Some(v) = changes.description {
            self.description = Some(v);
        }
        if let Some(v) = changes.location {
            self.location = v;
        }
        if let Some(v) = changes.city {
            self.city = v;
        }
        if let Some(v) = changes.country {
            self.country = v;
        }
        if let Some(v) = changes.property_type {
            self.property_type = v;
        }
        if let Some(v) = changes.price_per_night {
            self.price_per_night = v;
        }
        if let Some(v) = changes.max_guests {
            self.max_guests = v;
        }
        if let Some(v) = changes.bedrooms {
            self.bedrooms = v;
        }
        if let Some(v) = changes.beds {
            self.beds = v;
        }
        if let Some(v) = changes.bathrooms {
            self.bathrooms = v;
        }
    }

    /// First image, used by booking summaries
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Scalar invariants shared by create and update
    pub fn validate(&self) -> ServiceResult<()> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::invalid("Property name is required"));
        }
        if !(self.price_per_night > 0.0) {
            return Err(ServiceError::invalid("Price per night must be positive"));
        }
        if self.max_guests < 1 {
            return Err(ServiceError::invalid("Max guests must be at least 1"));
        }
        if self.bedrooms < 0 || self.beds < 0 || self.bathrooms < 0 {
            return Err(ServiceError::invalid("Room counts cannot be negative"));
        }
        Ok(())
    }
}

/// Property with everything the detail page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDetail {
    pub property: Property,
    pub rooms: Vec<Room>,
    pub reviews: Vec<Review>,
}

/// Listing input supplied by a host.
#[derive(Debug, Clone, Default)]
pub struct NewProperty {
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub country: String,
    pub property_type: String,
    pub price_per_night: f64,
    pub max_guests: i64,
    pub bedrooms: i64,
    pub beds: i64,
    pub bathrooms: i64,
    pub images: Vec<String>,
    /// Amenity names; names missing from the catalogue are dropped on insert
    pub amenities: Vec<String>,
    pub rooms: Vec<NewRoom>,
}

/// Partial update of a property's scalar fields.
#[derive(Debug, Clone, Default)]
pub struct PropertyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub property_type: Option<String>,
    pub price_per_night: Option<f64>,
    pub max_guests: Option<i64>,
    pub bedrooms: Option<i64>,
    pub beds: Option<i64>,
    pub bathrooms: Option<i64>,
}

/// Listing filters. Every `None` means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Case-insensitive substring over location, city and country
    pub destination: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    /// Minimum capacity
    pub guests: Option<i64>,
    /// Only properties with no confirmed booking overlapping these dates
    pub available: Option<StayDates>,
}

impl PropertyFilter {
    /// Scalar predicate (everything except `available`, which needs bookings)
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(dest) = self.destination.as_deref() {
            let needle = dest.to_lowercase();
            let hit = [&property.location, &property.city, &property.country]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(t) = self.property_type.as_deref() {
            if property.property_type != t {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if property.price_per_night < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.price_per_night > max {
                return false;
            }
        }
        if let Some(rating) = self.min_rating {
            if property.rating < rating {
                return false;
            }
        }
        if let Some(guests) = self.guests {
            if property.max_guests < guests {
                return false;
            }
        }
        true
    }
}

/// Offset/limit pagination expressed as 1-based pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Clamp raw query values: page >= 1, limit in 1..=100
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Number of pages, `ceil(total / limit)`
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit))
    }
}
