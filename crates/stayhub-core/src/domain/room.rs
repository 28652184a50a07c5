//! Room entity - a bookable unit inside a property

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    /// Owning property
    pub property_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_per_night: f64,
    pub max_guests: i64,
    pub amenities: Vec<String>,
}

impl Room {
    pub fn new(property_id: impl Into<String>, name: impl Into<String>, price_per_night: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            property_id: property_id.into(),
            name: name.into(),
            description: None,
            price_per_night,
            max_guests: 2,
            amenities: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_guests(mut self, max_guests: i64) -> Self {
        self.max_guests = max_guests;
        self
    }

    pub fn with_amenities(mut self, amenities: Vec<String>) -> Self {
        self.amenities = amenities;
        self
    }
}

/// Room definition supplied when a host lists a property.
#[derive(Debug, Clone, Default)]
pub struct NewRoom {
    pub name: String,
    pub description: Option<String>,
    pub price_per_night: f64,
    pub max_guests: i64,
    pub amenities: Vec<String>,
}
