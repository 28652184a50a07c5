//! Mock repository implementations for testing
//!
//! In-memory implementations of all repository traits for fast, isolated tests.
//! Every repository is a view over one shared [`MockStore`], so cascades and
//! the availability filter see the same data SQLite would.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stayhub_core::{
    domain::{
        sort_for_listing, Booking, BookingStatus, BookingWithProperty, Page, PageRequest,
        PasswordCredential, Property, PropertyDetail, PropertyFilter, PropertySummary, Review,
        Room, StayDates, User, DEFAULT_AMENITIES,
    },
    repository::{
        BookingRepository, CredentialRepository, EmailTaken, PropertyRepository, RepoResult,
        UserRepository,
    },
};

/// Shared in-memory tables
#[derive(Default)]
pub struct MockStore {
    users: RwLock<HashMap<String, User>>,
    credentials: RwLock<HashMap<String, PasswordCredential>>,
    properties: RwLock<HashMap<String, Property>>,
    rooms: RwLock<Vec<Room>>,
    reviews: RwLock<Vec<Review>>,
    bookings: RwLock<Vec<Booking>>,
}

impl MockStore {
    fn blocks(&self, property_id: &str, dates: &StayDates) -> bool {
        self.bookings
            .read()
            .unwrap()
            .iter()
            .any(|b| b.property_id == property_id && b.blocks(dates))
    }
}

/// All four repositories over one store
#[derive(Clone)]
pub struct MockRepositories {
    pub store: Arc<MockStore>,
    pub users: Arc<MockUserRepository>,
    pub credentials: Arc<MockCredentialRepository>,
    pub properties: Arc<MockPropertyRepository>,
    pub bookings: Arc<MockBookingRepository>,
}

impl MockRepositories {
    pub fn new() -> Self {
        let store = Arc::new(MockStore::default());
        Self {
            users: Arc::new(MockUserRepository(store.clone())),
            credentials: Arc::new(MockCredentialRepository(store.clone())),
            properties: Arc::new(MockPropertyRepository(store.clone())),
            bookings: Arc::new(MockBookingRepository(store.clone())),
            store,
        }
    }

    /// Reviews have no write path in the API, so tests seed them here
    pub fn with_review(self, review: Review) -> Self {
        self.store.reviews.write().unwrap().push(review);
        self
    }

    pub fn booking_count(&self) -> usize {
        self.store.bookings.read().unwrap().len()
    }
}

impl Default for MockRepositories {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MockUserRepository
// ============================================================================

pub struct MockUserRepository(Arc<MockStore>);

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn get(&self, id: &str) -> RepoResult<Option<User>> {
        Ok(self.0.users.read().unwrap().get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .0
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut users = self.0.users.write().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(EmailTaken.into());
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn create_with_credential(
        &self,
        user: &User,
        credential: &PasswordCredential,
    ) -> RepoResult<()> {
        // Both guards held so the pair lands together
        let mut users = self.0.users.write().unwrap();
        let mut credentials = self.0.credentials.write().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(EmailTaken.into());
        }
        users.insert(user.id.clone(), user.clone());
        credentials.insert(credential.user_id.clone(), credential.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut users = self.0.users.write().unwrap();
        if !users.contains_key(&user.id) {
            anyhow::bail!("User not found: {}", user.id);
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(EmailTaken.into());
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

// ============================================================================
// MockCredentialRepository
// ============================================================================

pub struct MockCredentialRepository(Arc<MockStore>);

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn get(&self, user_id: &str) -> RepoResult<Option<PasswordCredential>> {
        Ok(self.0.credentials.read().unwrap().get(user_id).cloned())
    }

    async fn upsert(&self, credential: &PasswordCredential) -> RepoResult<()> {
        self.0
            .credentials
            .write()
            .unwrap()
            .insert(credential.user_id.clone(), credential.clone());
        Ok(())
    }
}

// ============================================================================
// MockPropertyRepository
// ============================================================================

pub struct MockPropertyRepository(Arc<MockStore>);

#[async_trait]
impl PropertyRepository for MockPropertyRepository {
    async fn list(&self, filter: &PropertyFilter, page: PageRequest) -> RepoResult<Page<Property>> {
        let mut matching: Vec<Property> = self
            .0
            .properties
            .read()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p))
            .filter(|p| match &filter.available {
                Some(dates) => !self.0.blocks(&p.id, dates),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn get(&self, id: &str) -> RepoResult<Option<Property>> {
        Ok(self.0.properties.read().unwrap().get(id).cloned())
    }

    async fn get_detail(&self, id: &str) -> RepoResult<Option<PropertyDetail>> {
        let Some(property) = self.get(id).await? else {
            return Ok(None);
        };
        let rooms = self
            .0
            .rooms
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.property_id == id)
            .cloned()
            .collect();
        let mut reviews: Vec<Review> = self
            .0
            .reviews
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.property_id == id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(Some(PropertyDetail {
            property,
            rooms,
            reviews,
        }))
    }

    async fn create(&self, property: &Property, rooms: &[Room]) -> RepoResult<()> {
        let mut stored = property.clone();
        // Same as the SQL catalogue join: known names only, catalogue order
        stored.amenities = DEFAULT_AMENITIES
            .iter()
            .filter(|name| property.amenities.iter().any(|a| a == *name))
            .map(|name| name.to_string())
            .collect();

        self.0
            .properties
            .write()
            .unwrap()
            .insert(stored.id.clone(), stored);
        self.0.rooms.write().unwrap().extend_from_slice(rooms);
        Ok(())
    }

    async fn update(&self, property: &Property) -> RepoResult<()> {
        let mut properties = self.0.properties.write().unwrap();
        let Some(existing) = properties.get_mut(&property.id) else {
            anyhow::bail!("Property not found: {}", property.id);
        };
        let (images, amenities) = (existing.images.clone(), existing.amenities.clone());
        *existing = Property {
            images,
            amenities,
            ..property.clone()
        };
        Ok(())
    }

    async fn delete_if_no_upcoming(&self, id: &str, today: NaiveDate) -> RepoResult<bool> {
        // Same order as the readers: properties, then bookings
        let mut properties = self.0.properties.write().unwrap();
        let mut bookings = self.0.bookings.write().unwrap();
        let upcoming = bookings
            .iter()
            .any(|b| b.property_id == id && b.is_confirmed() && b.check_out_date >= today);
        if upcoming || properties.remove(id).is_none() {
            return Ok(false);
        }
        bookings.retain(|b| b.property_id != id);
        self.0.rooms.write().unwrap().retain(|r| r.property_id != id);
        self.0.reviews.write().unwrap().retain(|r| r.property_id != id);
        Ok(true)
    }

    async fn get_room(&self, room_id: &str) -> RepoResult<Option<Room>> {
        Ok(self
            .0
            .rooms
            .read()
            .unwrap()
            .iter()
            .find(|r| r.id == room_id)
            .cloned())
    }
}

// ============================================================================
// MockBookingRepository
// ============================================================================

pub struct MockBookingRepository(Arc<MockStore>);

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<BookingWithProperty>> {
        let properties = self.0.properties.read().unwrap();
        let mut listed: Vec<BookingWithProperty> = self
            .0
            .bookings
            .read()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| {
                properties.get(&b.property_id).map(|p| BookingWithProperty {
                    booking: b.clone(),
                    property: PropertySummary::from(p),
                })
            })
            .collect();
        sort_for_listing(&mut listed);
        Ok(listed)
    }

    async fn get(&self, id: &str) -> RepoResult<Option<Booking>> {
        Ok(self
            .0
            .bookings
            .read()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn find_overlapping(&self, property_id: &str, dates: &StayDates) -> RepoResult<Vec<Booking>> {
        Ok(self
            .0
            .bookings
            .read()
            .unwrap()
            .iter()
            .filter(|b| b.property_id == property_id && b.blocks(dates))
            .cloned()
            .collect())
    }

    async fn insert_if_available(&self, booking: &Booking) -> RepoResult<bool> {
        let dates = StayDates::new(booking.check_in_date, booking.check_out_date)?;
        // Guards held across the checks and the push, properties first
        let properties = self.0.properties.read().unwrap();
        let mut bookings = self.0.bookings.write().unwrap();
        if !properties.contains_key(&booking.property_id)
            || bookings
                .iter()
                .any(|b| b.property_id == booking.property_id && b.blocks(&dates))
        {
            return Ok(false);
        }
        bookings.push(booking.clone());
        Ok(true)
    }

    async fn set_status(&self, id: &str, status: BookingStatus) -> RepoResult<()> {
        let mut bookings = self.0.bookings.write().unwrap();
        let Some(booking) = bookings.iter_mut().find(|b| b.id == id) else {
            anyhow::bail!("Booking not found: {}", id);
        };
        booking.status = status;
        Ok(())
    }
}
