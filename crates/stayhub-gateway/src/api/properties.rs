//! Property payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stayhub_core::{
    NewProperty, NewRoom, Page, PageRequest, Property, PropertyChanges, PropertyDetail,
    PropertyFilter, Review, Room, ServiceResult, StayDates,
};

use super::de;

/// `GET /properties` query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "de::optional")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "de::optional")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "de::optional")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub check_out: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional")]
    pub guests: Option<i64>,
    #[serde(default, deserialize_with = "de::optional")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "de::optional")]
    pub limit: Option<u32>,
}

impl PropertyListQuery {
    /// Split into the catalog filter and the clamped page request
    pub fn into_parts(self) -> ServiceResult<(PropertyFilter, PageRequest)> {
        let available = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => Some(StayDates::new(check_in, check_out)?),
            _ => None,
        };

        let filter = PropertyFilter {
            destination: self.destination.filter(|d| !d.trim().is_empty()),
            property_type: self.property_type.filter(|t| !t.is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.rating,
            guests: self.guests,
            available,
        };

        Ok((filter, PageRequest::new(self.page, self.limit)))
    }
}

/// A property as listed. `host_id` and `created_at` keep their legacy names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub country: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub price_per_night: f64,
    pub rating: f64,
    pub review_count: i64,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub max_guests: i64,
    pub bedrooms: i64,
    pub beds: i64,
    pub bathrooms: i64,
    #[serde(rename = "host_id")]
    pub host_id: String,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl From<Property> for PropertyResponse {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            location: p.location,
            city: p.city,
            country: p.country,
            property_type: p.property_type,
            price_per_night: p.price_per_night,
            rating: p.rating,
            review_count: p.review_count,
            images: p.images,
            amenities: p.amenities,
            max_guests: p.max_guests,
            bedrooms: p.bedrooms,
            beds: p.beds,
            bathrooms: p.bathrooms,
            host_id: p.host_id,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationResponse {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

#[derive(Debug, Serialize)]
pub struct PropertyListResponse {
    pub properties: Vec<PropertyResponse>,
    pub pagination: PaginationResponse,
}

impl From<Page<Property>> for PropertyListResponse {
    fn from(page: Page<Property>) -> Self {
        let pagination = PaginationResponse {
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages: page.pages(),
        };
        Self {
            properties: page.items.into_iter().map(PropertyResponse::from).collect(),
            pagination,
        }
    }
}

/// Room as shown to clients: `price` and `capacity`
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub capacity: i64,
    pub amenities: Vec<String>,
}

impl From<Room> for RoomResponse {
    fn from(r: Room) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price_per_night,
            capacity: r.max_guests,
            amenities: r.amenities,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerResponse {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: ReviewerResponse,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            user: ReviewerResponse {
                first_name: r.reviewer_first_name,
                last_name: r.reviewer_last_name,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyDetailResponse {
    #[serde(flatten)]
    pub property: PropertyResponse,
    pub rooms: Vec<RoomResponse>,
    pub reviews: Vec<ReviewResponse>,
}

impl From<PropertyDetail> for PropertyDetailResponse {
    fn from(detail: PropertyDetail) -> Self {
        Self {
            property: detail.property.into(),
            rooms: detail.rooms.into_iter().map(RoomResponse::from).collect(),
            reviews: detail.reviews.into_iter().map(ReviewResponse::from).collect(),
        }
    }
}

fn default_max_guests() -> i64 {
    1
}

fn default_room_guests() -> i64 {
    2
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "price")]
    pub price_per_night: f64,
    #[serde(default = "default_room_guests", alias = "capacity")]
    pub max_guests: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl From<CreateRoomRequest> for NewRoom {
    fn from(r: CreateRoomRequest) -> Self {
        NewRoom {
            name: r.name,
            description: r.description,
            price_per_night: r.price_per_night,
            max_guests: r.max_guests,
            amenities: r.amenities,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, rename = "type")]
    pub property_type: String,
    pub price_per_night: f64,
    #[serde(default = "default_max_guests")]
    pub max_guests: i64,
    #[serde(default)]
    pub bedrooms: i64,
    #[serde(default)]
    pub beds: i64,
    #[serde(default)]
    pub bathrooms: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub rooms: Vec<CreateRoomRequest>,
}

impl From<CreatePropertyRequest> for NewProperty {
    fn from(r: CreatePropertyRequest) -> Self {
        NewProperty {
            name: r.name,
            description: r.description,
            location: r.location,
            city: r.city,
            country: r.country,
            property_type: r.property_type,
            price_per_night: r.price_per_night,
            max_guests: r.max_guests,
            bedrooms: r.bedrooms,
            beds: r.beds,
            bathrooms: r.bathrooms,
            images: r.images,
            amenities: r.amenities,
            rooms: r.rooms.into_iter().map(NewRoom::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyResponse {
    pub message: &'static str,
    pub property_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub price_per_night: Option<f64>,
    pub max_guests: Option<i64>,
    pub bedrooms: Option<i64>,
    pub beds: Option<i64>,
    pub bathrooms: Option<i64>,
}

impl From<UpdatePropertyRequest> for PropertyChanges {
    fn from(r: UpdatePropertyRequest) -> Self {
        PropertyChanges {
            name: r.name,
            description: r.description,
            location: r.location,
            city: r.city,
            country: r.country,
            property_type: r.property_type,
            price_per_night: r.price_per_night,
            max_guests: r.max_guests,
            bedrooms: r.bedrooms,
            beds: r.beds,
            bathrooms: r.bathrooms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatePropertyResponse {
    pub message: &'static str,
    pub property: PropertyResponse,
}
