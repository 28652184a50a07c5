//! Repository traits for data access
//!
//! These traits define the interface for data storage without specifying
//! the implementation (SQLite, in-memory, etc.)

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Booking, BookingStatus, BookingWithProperty, Page, PageRequest, PasswordCredential, Property,
    PropertyDetail, PropertyFilter, Room, StayDates, User,
};

/// Result type for repository operations
pub type RepoResult<T> = anyhow::Result<T>;

/// A user write collided with another account's email address.
///
/// Repositories return it inside the `anyhow::Error` so services can tell it
/// apart from store failures with [`anyhow::Error::is`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Email address is already taken")]
pub struct EmailTaken;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID
    async fn get(&self, id: &str) -> RepoResult<Option<User>>;

    /// Get a user by (normalized) email
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Create a new user. Fails with [`EmailTaken`] on a duplicate email.
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Create a user together with their password credential, both or neither.
    /// Fails with [`EmailTaken`] on a duplicate email.
    async fn create_with_credential(
        &self,
        user: &User,
        credential: &PasswordCredential,
    ) -> RepoResult<()>;

    /// Update profile fields. Fails with [`EmailTaken`] on a duplicate email.
    async fn update(&self, user: &User) -> RepoResult<()>;
}

/// Password credential repository trait (identity service storage)
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Get the credential for a user
    async fn get(&self, user_id: &str) -> RepoResult<Option<PasswordCredential>>;

    /// Create or replace the credential for a user
    async fn upsert(&self, credential: &PasswordCredential) -> RepoResult<()>;
}

/// Property repository trait
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Filtered, paginated listing with images and amenities loaded
    async fn list(&self, filter: &PropertyFilter, page: PageRequest)
        -> RepoResult<Page<Property>>;

    /// Get a property with images and amenities
    async fn get(&self, id: &str) -> RepoResult<Option<Property>>;

    /// Get a property with rooms and reviews as well
    async fn get_detail(&self, id: &str) -> RepoResult<Option<PropertyDetail>>;

    /// Insert a property, its images, its rooms, and links to known amenities
    async fn create(&self, property: &Property, rooms: &[Room]) -> RepoResult<()>;

    /// Update scalar fields
    async fn update(&self, property: &Property) -> RepoResult<()>;

    /// Delete a property and everything that hangs off it, unless it has a
    /// confirmed booking ending on or after `today`. The check and the delete
    /// are atomic with respect to other calls. Returns `false` when refused.
    async fn delete_if_no_upcoming(&self, id: &str, today: NaiveDate) -> RepoResult<bool>;

    /// Get a room by ID
    async fn get_room(&self, room_id: &str) -> RepoResult<Option<Room>>;
}

/// Booking repository trait
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings owned by a user, joined with a property summary,
    /// ordered by check-in descending then id ascending
    async fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<BookingWithProperty>>;

    /// Get a booking by ID
    async fn get(&self, id: &str) -> RepoResult<Option<Booking>>;

    /// Confirmed bookings on `property_id` overlapping `dates` (inclusive predicate)
    async fn find_overlapping(&self, property_id: &str, dates: &StayDates)
        -> RepoResult<Vec<Booking>>;

    /// Insert `booking` only if its property still exists and no confirmed
    /// booking on it overlaps. The checks and the insert are atomic with
    /// respect to other calls. Returns `false` when nothing was inserted.
    async fn insert_if_available(&self, booking: &Booking) -> RepoResult<bool>;

    /// Persist a status change
    async fn set_status(&self, id: &str, status: BookingStatus) -> RepoResult<()>;
}
