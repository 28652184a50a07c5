//! SQLite implementation of BookingRepository.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use stayhub_core::{
    Booking, BookingRepository, BookingStatus, BookingWithProperty, PropertySummary, StayDates,
};
use tokio::sync::Mutex;

use super::{date_column, format_date, format_datetime, parse_datetime, parsed_column};
use crate::Database;

const BOOKING_COLUMNS: &str = "b.id, b.property_id, b.room_id, b.user_id, b.check_in_date, \
     b.check_out_date, b.guests, b.total_price, b.status, b.created_at";

/// Number of columns in [`BOOKING_COLUMNS`]; joined columns start here.
const BOOKING_COLUMN_COUNT: usize = 10;

/// SQLite-backed implementation of BookingRepository.
pub struct SqliteBookingRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteBookingRepository {
    /// Create a new SQLite booking repository.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn row_to_booking(row: &Row<'_>) -> rusqlite::Result<Booking> {
        Ok(Booking {
            id: row.get(0)?,
            property_id: row.get(1)?,
            room_id: row.get(2)?,
            user_id: row.get(3)?,
            check_in_date: date_column(row, 4)?,
            check_out_date: date_column(row, 5)?,
            guests: row.get(6)?,
            total_price: row.get(7)?,
            status: parsed_column(row, 8)?,
            created_at: parse_datetime(&row.get::<_, String>(9)?),
        })
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingWithProperty>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOKING_COLUMNS},
                    p.id, p.name, p.location, p.city, p.country,
                    (SELECT i.url FROM property_images i
                     WHERE i.property_id = p.id
                     ORDER BY i.position, i.id LIMIT 1)
             FROM bookings b
             JOIN properties p ON p.id = b.property_id
             WHERE b.user_id = ?
             ORDER BY b.check_in_date DESC, b.id ASC"
        ))?;

        let bookings = stmt
            .query_map(params![user_id], |row| {
                let at = BOOKING_COLUMN_COUNT;
                Ok(BookingWithProperty {
                    booking: Self::row_to_booking(row)?,
                    property: PropertySummary {
                        id: row.get(at)?,
                        name: row.get(at + 1)?,
                        location: row.get(at + 2)?,
                        city: row.get(at + 3)?,
                        country: row.get(at + 4)?,
                        image: row.get(at + 5)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "[BookingRepository::list_for_user] {} bookings for {}",
            bookings.len(),
            user_id
        );

        Ok(bookings)
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>> {
        let db = self.db.lock().await;
        let booking = db
            .connection()
            .query_row(
                &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?"),
                params![id],
                Self::row_to_booking,
            )
            .optional()?;
        Ok(booking)
    }

    async fn find_overlapping(&self, property_id: &str, dates: &StayDates) -> Result<Vec<Booking>> {
        let db = self.db.lock().await;
        let mut stmt = db.connection().prepare(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b
             WHERE b.property_id = ?1
               AND b.status = 'confirmed'
               AND b.check_in_date <= ?2
               AND b.check_out_date >= ?3
             ORDER BY b.check_in_date"
        ))?;

        let bookings = stmt
            .query_map(
                params![
                    property_id,
                    format_date(dates.check_out()),
                    format_date(dates.check_in()),
                ],
                Self::row_to_booking,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    async fn insert_if_available(&self, booking: &Booking) -> Result<bool> {
        let db = self.db.lock().await;

        // Check and insert in one statement so no other writer can slip in between
        let inserted = db.connection().execute(
            "INSERT INTO bookings (id, property_id, room_id, user_id, check_in_date, check_out_date,
                guests, total_price, status, created_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
             WHERE EXISTS (SELECT 1 FROM properties WHERE id = ?2)
             AND NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE property_id = ?2
                  AND status = 'confirmed'
                  AND check_in_date <= ?6
                  AND check_out_date >= ?5
             )",
            params![
                booking.id,
                booking.property_id,
                booking.room_id,
                booking.user_id,
                format_date(booking.check_in_date),
                format_date(booking.check_out_date),
                booking.guests,
                booking.total_price,
                booking.status.as_str(),
                format_datetime(&booking.created_at),
            ],
        )?;

        Ok(inserted == 1)
    }

    async fn set_status(&self, id: &str, status: BookingStatus) -> Result<()> {
        let db = self.db.lock().await;
        let rows_affected = db.connection().execute(
            "UPDATE bookings SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("Booking not found: {}", id);
        }

        Ok(())
    }
}
