//! Booking service - availability, ownership and the booking lifecycle

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    quote_total, Booking, BookingDetail, BookingWithProperty, Caller, NewBooking, StayDates,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::BookingRepository;
use crate::service::CatalogService;

/// Tolerance when comparing a caller-supplied total with the server quote.
const PRICE_TOLERANCE: f64 = 0.005;

const DATES_NOT_AVAILABLE: &str = "The selected dates are not available";

/// Service for creating, reading and cancelling bookings
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    catalog: Arc<CatalogService>,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(bookings: Arc<dyn BookingRepository>, catalog: Arc<CatalogService>) -> Self {
        Self { bookings, catalog }
    }

    /// The caller's bookings, newest check-in first
    pub async fn list_mine(&self, caller: &Caller) -> ServiceResult<Vec<BookingWithProperty>> {
        Ok(self.bookings.list_for_user(&caller.user_id).await?)
    }

    /// One booking with its full property. Owner or admin only.
    pub async fn get(&self, caller: &Caller, id: &str) -> ServiceResult<BookingDetail> {
        let booking = self.load(id).await?;
        if !caller.can_act_for(&booking.user_id) {
            return Err(ServiceError::forbidden(
                "Not authorized to view this booking",
            ));
        }

        let property = self.catalog.get_detail(&booking.property_id).await?;
        Ok(BookingDetail { booking, property })
    }

    /// Create a confirmed booking.
    ///
    /// Order of checks: property exists, room belongs to it, request is
    /// valid, dates are free. The final insert re-checks availability
    /// atomically, so two racing requests cannot both confirm.
    pub async fn create(&self, caller: &Caller, input: NewBooking) -> ServiceResult<Booking> {
        let property = self.catalog.property_exists(&input.property_id).await?;

        let room = match input.room_id.as_deref() {
            Some(room_id) => Some(
                self.catalog
                    .room_in_property(room_id, &property.id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::not_found(
                            "Room not found or does not belong to the property",
                        )
                    })?,
            ),
            None => None,
        };

        let dates = StayDates::new(input.check_in, input.check_out)?;

        let capacity = room.as_ref().map_or(property.max_guests, |r| r.max_guests);
        if input.guests < 1 {
            return Err(ServiceError::invalid("At least one guest is required"));
        }
        if input.guests > capacity {
            return Err(ServiceError::invalid(format!(
                "Guest count exceeds the maximum of {}",
                capacity
            )));
        }

        let nightly = room
            .as_ref()
            .map_or(property.price_per_night, |r| r.price_per_night);
        let total = quote_total(&dates, nightly);
        if let Some(claimed) = input.total_price {
            if (claimed - total).abs() > PRICE_TOLERANCE {
                return Err(ServiceError::invalid(format!(
                    "Total price does not match the quoted price of {:.2}",
                    total
                )));
            }
        }

        let overlapping = self.bookings.find_overlapping(&property.id, &dates).await?;
        if !overlapping.is_empty() {
            info!(
                property_id = %property.id,
                conflicts = overlapping.len(),
                "[BookingService] Dates not available"
            );
            return Err(ServiceError::conflict(DATES_NOT_AVAILABLE));
        }

        let mut booking = Booking::new(&property.id, &caller.user_id, dates, input.guests, total);
        if let Some(room) = room {
            booking = booking.with_room(room.id);
        }

        if !self.bookings.insert_if_available(&booking).await? {
            // Deleted since the lookup above
            self.catalog.property_exists(&property.id).await?;
            warn!(
                property_id = %property.id,
                "[BookingService] Lost availability race, rejecting booking"
            );
            return Err(ServiceError::conflict(DATES_NOT_AVAILABLE));
        }

        info!(
            booking_id = %booking.id,
            property_id = %booking.property_id,
            user_id = %booking.user_id,
            nights = dates.nights(),
            "[BookingService] Created booking"
        );

        Ok(booking)
    }

    /// Cancel a confirmed booking. Owner or admin only.
    pub async fn cancel(&self, caller: &Caller, id: &str) -> ServiceResult<Booking> {
        let mut booking = self.load(id).await?;
        if !caller.can_act_for(&booking.user_id) {
            return Err(ServiceError::forbidden(
                "Not authorized to cancel this booking",
            ));
        }

        booking.cancel()?;
        self.bookings.set_status(&booking.id, booking.status).await?;

        info!(booking_id = %booking.id, by = %caller.user_id, "[BookingService] Cancelled booking");

        Ok(booking)
    }

    async fn load(&self, id: &str) -> ServiceResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking not found"))
    }
}
