//! Catalog service - property listing, detail and host management

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{
    Caller, NewProperty, Page, PageRequest, Property, PropertyChanges, PropertyDetail,
    PropertyFilter, Room,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::PropertyRepository;

/// Service for properties and their rooms
pub struct CatalogService {
    properties: Arc<dyn PropertyRepository>,
}

impl CatalogService {
    /// Create a new CatalogService
    pub fn new(properties: Arc<dyn PropertyRepository>) -> Self {
        Self { properties }
    }

    /// Filtered, paginated listing
    pub async fn list(
        &self,
        filter: &PropertyFilter,
        page: PageRequest,
    ) -> ServiceResult<Page<Property>> {
        let result = self.properties.list(filter, page).await?;
        debug!(
            total = result.total,
            page = result.page,
            returned = result.items.len(),
            "[CatalogService] Listed properties"
        );
        Ok(result)
    }

    /// Property with images, amenities, rooms and reviews
    pub async fn get_detail(&self, id: &str) -> ServiceResult<PropertyDetail> {
        self.properties
            .get_detail(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))
    }

    /// Existence contract used by the booking service
    pub async fn property_exists(&self, id: &str) -> ServiceResult<Property> {
        self.properties
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))
    }

    /// The room, if it exists and belongs to `property_id`
    pub async fn room_in_property(
        &self,
        room_id: &str,
        property_id: &str,
    ) -> ServiceResult<Option<Room>> {
        let room = self.properties.get_room(room_id).await?;
        Ok(room.filter(|r| r.property_id == property_id))
    }

    pub async fn room_belongs_to_property(
        &self,
        room_id: &str,
        property_id: &str,
    ) -> ServiceResult<bool> {
        Ok(self.room_in_property(room_id, property_id).await?.is_some())
    }

    /// List a new property; the caller becomes its host
    pub async fn create(&self, caller: &Caller, input: NewProperty) -> ServiceResult<Property> {
        let property = Property::new(&caller.user_id, &input);
        property.validate()?;

        let mut rooms = Vec::with_capacity(input.rooms.len());
        for new_room in input.rooms {
            if new_room.name.trim().is_empty() {
                return Err(ServiceError::invalid("Room name is required"));
            }
            if !(new_room.price_per_night > 0.0) {
                return Err(ServiceError::invalid("Room price per night must be positive"));
            }
            if new_room.max_guests < 1 {
                return Err(ServiceError::invalid("Room max guests must be at least 1"));
            }
            let mut room = Room::new(&property.id, new_room.name, new_room.price_per_night)
                .with_max_guests(new_room.max_guests)
                .with_amenities(new_room.amenities);
            room.description = new_room.description;
            rooms.push(room);
        }

        self.properties.create(&property, &rooms).await?;

        info!(
            property_id = %property.id,
            host_id = %caller.user_id,
            rooms = rooms.len(),
            "[CatalogService] Created property"
        );

        // Re-read so the result carries only the amenities that were linked
        Ok(self
            .properties
            .get(&property.id)
            .await?
            .unwrap_or(property))
    }

    /// Partial update, host or admin only
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        changes: PropertyChanges,
    ) -> ServiceResult<Property> {
        let mut property = self.property_exists(id).await?;
        if !caller.can_act_for(&property.host_id) {
            return Err(ServiceError::forbidden(
                "Not authorized to update this property",
            ));
        }

        property.apply(changes);
        property.validate()?;
        self.properties.update(&property).await?;

        info!(property_id = %property.id, by = %caller.user_id, "[CatalogService] Updated property");

        Ok(property)
    }

    /// Delete, host or admin only. Refused while upcoming confirmed bookings exist.
    pub async fn delete(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        let property = self.property_exists(id).await?;
        if !caller.can_act_for(&property.host_id) {
            return Err(ServiceError::forbidden(
                "Not authorized to delete this property",
            ));
        }

        let today = Utc::now().date_naive();
        if !self.properties.delete_if_no_upcoming(id, today).await? {
            return Err(ServiceError::conflict(
                "Property has upcoming confirmed bookings and cannot be deleted",
            ));
        }

        info!(property_id = %id, by = %caller.user_id, "[CatalogService] Deleted property");

        Ok(())
    }
}
