//! SQLite implementation of PropertyRepository.
//!
//! Listing filters are compiled into a single parameterised WHERE clause so
//! that the count and the page query always agree on the result set.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use stayhub_core::{
    Page, PageRequest, Property, PropertyDetail, PropertyFilter, PropertyRepository, Review, Room,
};
use tokio::sync::Mutex;

use super::{format_date, format_datetime, parse_datetime};
use crate::Database;

const PROPERTY_COLUMNS: &str = "p.id, p.name, p.description, p.location, p.city, p.country, p.type, \
     p.price_per_night, p.rating, p.review_count, p.max_guests, p.bedrooms, p.beds, p.bathrooms, \
     p.host_id, p.created_at";

const ROOM_COLUMNS: &str = "id, property_id, name, description, price_per_night, max_guests, amenities";

/// SQLite-backed implementation of PropertyRepository.
pub struct SqlitePropertyRepository {
    db: Arc<Mutex<Database>>,
}

/// WHERE clause plus its positional parameters.
struct FilterSql {
    clause: String,
    params: Vec<Value>,
}

/// Escape LIKE wildcards so a destination is matched literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl FilterSql {
    fn build(filter: &PropertyFilter) -> Self {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(dest) = filter.destination.as_deref().filter(|d| !d.trim().is_empty()) {
            conditions.push(
                "(LOWER(p.location) LIKE ? ESCAPE '\\' \
                 OR LOWER(p.city) LIKE ? ESCAPE '\\' \
                 OR LOWER(p.country) LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(dest.trim());
            for _ in 0..3 {
                params.push(Value::Text(pattern.clone()));
            }
        }
        if let Some(t) = filter.property_type.as_deref() {
            conditions.push("p.type = ?");
            params.push(Value::Text(t.to_string()));
        }
        if let Some(min) = filter.min_price {
            conditions.push("p.price_per_night >= ?");
            params.push(Value::Real(min));
        }
        if let Some(max) = filter.max_price {
            conditions.push("p.price_per_night <= ?");
            params.push(Value::Real(max));
        }
        if let Some(rating) = filter.min_rating {
            conditions.push("p.rating >= ?");
            params.push(Value::Real(rating));
        }
        if let Some(guests) = filter.guests {
            conditions.push("p.max_guests >= ?");
            params.push(Value::Integer(guests));
        }
        if let Some(dates) = filter.available {
            // Same inclusive predicate the booking path uses
            conditions.push(
                "NOT EXISTS (SELECT 1 FROM bookings b \
                 WHERE b.property_id = p.id AND b.status = 'confirmed' \
                 AND b.check_in_date <= ? AND b.check_out_date >= ?)",
            );
            params.push(Value::Text(format_date(dates.check_out())));
            params.push(Value::Text(format_date(dates.check_in())));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        Self { clause, params }
    }
}

impl SqlitePropertyRepository {
    /// Create a new SQLite property repository.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn row_to_property(row: &Row<'_>) -> rusqlite::Result<Property> {
        Ok(Property {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            location: row.get(3)?,
            city: row.get(4)?,
            country: row.get(5)?,
            property_type: row.get(6)?,
            price_per_night: row.get(7)?,
            rating: row.get(8)?,
            review_count: row.get(9)?,
            max_guests: row.get(10)?,
            bedrooms: row.get(11)?,
            beds: row.get(12)?,
            bathrooms: row.get(13)?,
            host_id: row.get(14)?,
            created_at: parse_datetime(&row.get::<_, String>(15)?),
            images: Vec::new(),
            amenities: Vec::new(),
        })
    }

    fn row_to_room(row: &Row<'_>) -> rusqlite::Result<Room> {
        let amenities_json: String = row.get(6)?;
        let amenities: Vec<String> = serde_json::from_str(&amenities_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

        Ok(Room {
            id: row.get(0)?,
            property_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            price_per_night: row.get(4)?,
            max_guests: row.get(5)?,
            amenities,
        })
    }

    /// Fill in images (display order) and amenity names.
    fn load_media(conn: &Connection, property: &mut Property) -> Result<()> {
        let mut stmt = conn.prepare_cached(
            "SELECT url FROM property_images WHERE property_id = ? ORDER BY position, id",
        )?;
        property.images = stmt
            .query_map(params![property.id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut stmt = conn.prepare_cached(
            "SELECT a.name FROM amenities a
             JOIN property_amenities pa ON pa.amenity_id = a.id
             WHERE pa.property_id = ?
             ORDER BY a.id",
        )?;
        property.amenities = stmt
            .query_map(params![property.id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(())
    }

    fn load_property(conn: &Connection, id: &str) -> Result<Option<Property>> {
        let property = conn
            .query_row(
                &format!("SELECT {PROPERTY_COLUMNS} FROM properties p WHERE p.id = ?"),
                params![id],
                Self::row_to_property,
            )
            .optional()?;

        match property {
            Some(mut property) => {
                Self::load_media(conn, &mut property)?;
                Ok(Some(property))
            }
            None => Ok(None),
        }
    }

    fn insert_room(conn: &Connection, room: &Room) -> Result<()> {
        conn.execute(
            "INSERT INTO rooms (id, property_id, name, description, price_per_night, max_guests, amenities)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                room.id,
                room.property_id,
                room.name,
                room.description,
                room.price_per_night,
                room.max_guests,
                serde_json::to_string(&room.amenities)?,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl PropertyRepository for SqlitePropertyRepository {
    async fn list(&self, filter: &PropertyFilter, page: PageRequest) -> Result<Page<Property>> {
        let db = self.db.lock().await;
        let conn = db.connection();
        let sql = FilterSql::build(filter);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM properties p {}", sql.clause),
            params_from_iter(sql.params.iter()),
            |row| row.get(0),
        )?;

        let mut page_params = sql.params.clone();
        page_params.push(Value::Integer(i64::from(page.limit)));
        page_params.push(Value::Integer(page.offset() as i64));

        let mut stmt = conn.prepare(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties p {}
             ORDER BY p.created_at DESC, p.id ASC
             LIMIT ? OFFSET ?",
            sql.clause
        ))?;
        let mut properties = stmt
            .query_map(params_from_iter(page_params.iter()), Self::row_to_property)?
            .collect::<Result<Vec<_>, _>>()?;

        for property in properties.iter_mut() {
            Self::load_media(conn, property)?;
        }

        tracing::debug!(
            "[PropertyRepository::list] {} of {} properties (page {})",
            properties.len(),
            total,
            page.page
        );

        Ok(Page::new(properties, total.max(0) as u64, page))
    }

    async fn get(&self, id: &str) -> Result<Option<Property>> {
        let db = self.db.lock().await;
        Self::load_property(db.connection(), id)
    }

    async fn get_detail(&self, id: &str) -> Result<Option<PropertyDetail>> {
        let db = self.db.lock().await;
        let conn = db.connection();

        let Some(property) = Self::load_property(conn, id)? else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE property_id = ? ORDER BY rowid"
        ))?;
        let rooms = stmt
            .query_map(params![id], Self::row_to_room)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT r.id, r.property_id, r.user_id, r.rating, r.comment, r.created_at,
                    u.first_name, u.last_name
             FROM reviews r
             JOIN users u ON u.id = r.user_id
             WHERE r.property_id = ?
             ORDER BY r.created_at DESC, r.id ASC",
        )?;
        let reviews = stmt
            .query_map(params![id], |row| {
                Ok(Review {
                    id: row.get(0)?,
                    property_id: row.get(1)?,
                    user_id: row.get(2)?,
                    rating: row.get(3)?,
                    comment: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    reviewer_first_name: row.get(6)?,
                    reviewer_last_name: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(PropertyDetail {
            property,
            rooms,
            reviews,
        }))
    }

    async fn create(&self, property: &Property, rooms: &[Room]) -> Result<()> {
        let db = self.db.lock().await;

        db.transaction(|conn| {
            conn.execute(
                "INSERT INTO properties (id, name, description, location, city, country, type,
                    price_per_night, rating, review_count, max_guests, bedrooms, beds, bathrooms,
                    host_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    property.id,
                    property.name,
                    property.description,
                    property.location,
                    property.city,
                    property.country,
                    property.property_type,
                    property.price_per_night,
                    property.rating,
                    property.review_count,
                    property.max_guests,
                    property.bedrooms,
                    property.beds,
                    property.bathrooms,
                    property.host_id,
                    format_datetime(&property.created_at),
                ],
            )?;

            for (position, url) in property.images.iter().enumerate() {
                conn.execute(
                    "INSERT INTO property_images (property_id, url, position) VALUES (?1, ?2, ?3)",
                    params![property.id, url, position as i64],
                )?;
            }

            // Unknown amenity names match no row and are silently skipped
            for name in &property.amenities {
                conn.execute(
                    "INSERT OR IGNORE INTO property_amenities (property_id, amenity_id)
                     SELECT ?1, id FROM amenities WHERE name = ?2",
                    params![property.id, name],
                )?;
            }

            for room in rooms {
                Self::insert_room(conn, room)?;
            }

            Ok(())
        })?;

        tracing::debug!(
            "[PropertyRepository] Created property {} with {} rooms",
            property.id,
            rooms.len()
        );
        Ok(())
    }

    async fn update(&self, property: &Property) -> Result<()> {
        let db = self.db.lock().await;
        let rows_affected = db.connection().execute(
            "UPDATE properties
             SET name = ?2, description = ?3, location = ?4, city = ?5, country = ?6, type = ?7,
                 price_per_night = ?8, max_guests = ?9, bedrooms = ?10, beds = ?11, bathrooms = ?12
             WHERE id = ?1",
            params![
                property.id,
                property.name,
                property.description,
                property.location,
                property.city,
                property.country,
                property.property_type,
                property.price_per_night,
                property.max_guests,
                property.bedrooms,
                property.beds,
                property.bathrooms,
            ],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("Property not found: {}", property.id);
        }

        Ok(())
    }

    async fn delete_if_no_upcoming(&self, id: &str, today: NaiveDate) -> Result<bool> {
        let db = self.db.lock().await;
        // Images, amenity links, rooms, bookings and reviews cascade
        let rows_affected = db.connection().execute(
            "DELETE FROM properties
             WHERE id = ?1 AND NOT EXISTS (
                SELECT 1 FROM bookings
                WHERE property_id = ?1 AND status = 'confirmed' AND check_out_date >= ?2
             )",
            params![id, format_date(today)],
        )?;
        Ok(rows_affected == 1)
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<Room>> {
        let db = self.db.lock().await;
        let room = db
            .connection()
            .query_row(
                &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?"),
                params![room_id],
                Self::row_to_room,
            )
            .optional()?;
        Ok(room)
    }
}
