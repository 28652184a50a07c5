//! Shared test utilities and fixtures for StayHub integration tests.

pub use stayhub_core::domain::{
    Booking, BookingStatus, Caller, NewBooking, NewProperty, NewRoom, Property, Review, Role,
    Room, StayDates, User,
};

/// Mock repository implementations
pub mod mocks;
pub use mocks::MockRepositories;

/// Test fixture utilities
pub mod fixtures {
    use super::*;
    use chrono::{NaiveDate, Utc};

    /// Parse `YYYY-MM-DD`
    pub fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("Invalid test date")
    }

    /// A date `days` from today
    pub fn days_from_now(days: i64) -> NaiveDate {
        Utc::now().date_naive() + chrono::Duration::days(days)
    }

    pub fn stay(check_in: &str, check_out: &str) -> StayDates {
        StayDates::new(date(check_in), date(check_out)).expect("Invalid test stay")
    }

    /// A guest user
    pub fn test_user(email: &str) -> User {
        User::new(email, "Test", "Guest")
    }

    /// An admin user
    pub fn test_admin(email: &str) -> User {
        User::new(email, "Ada", "Admin").with_role(Role::Admin)
    }

    pub fn caller_for(user: &User) -> Caller {
        Caller::from(user)
    }

    /// Listing input with sensible defaults
    pub fn test_listing(name: &str, city: &str, price_per_night: f64) -> NewProperty {
        NewProperty {
            name: name.to_string(),
            description: Some(format!("Test listing: {}", name)),
            location: "Centre".to_string(),
            city: city.to_string(),
            country: "Norway".to_string(),
            property_type: "apartment".to_string(),
            price_per_night,
            max_guests: 4,
            bedrooms: 2,
            beds: 2,
            bathrooms: 1,
            images: vec![format!("{}.jpg", name.to_lowercase().replace(' ', "-"))],
            amenities: vec!["WiFi".to_string(), "Kitchen".to_string()],
            rooms: vec![],
        }
    }

    /// A room definition
    pub fn test_room(name: &str, price_per_night: f64, max_guests: i64) -> NewRoom {
        NewRoom {
            name: name.to_string(),
            description: None,
            price_per_night,
            max_guests,
            amenities: vec!["Desk".to_string()],
        }
    }

    /// Create-booking input without a room or a claimed total
    pub fn booking_request(property_id: &str, check_in: &str, check_out: &str, guests: i64) -> NewBooking {
        NewBooking {
            property_id: property_id.to_string(),
            room_id: None,
            check_in: date(check_in),
            check_out: date(check_out),
            guests,
            total_price: None,
        }
    }

    /// A review by `user` on `property_id`
    pub fn test_review(property_id: &str, user: &User, rating: f64, comment: &str) -> Review {
        Review {
            id: uuid::Uuid::new_v4().to_string(),
            property_id: property_id.to_string(),
            user_id: user.id.clone(),
            rating,
            comment: Some(comment.to_string()),
            created_at: Utc::now(),
            reviewer_first_name: user.first_name.clone(),
            reviewer_last_name: user.last_name.clone(),
        }
    }
}

/// Service test helpers
pub mod services {
    use std::sync::Arc;

    use stayhub_core::{BookingService, CatalogService, UserService};
    use stayhub_gateway::{IdentityService, TokenSigner};
    use stayhub_storage::{PasswordHasher, TOKEN_SECRET_SIZE};
    use zeroize::Zeroizing;

    use crate::mocks::MockRepositories;

    /// Fast PBKDF2 work factor for tests
    pub const TEST_HASH_ITERATIONS: u32 = 1_000;

    pub fn test_secret() -> Zeroizing<[u8; TOKEN_SECRET_SIZE]> {
        Zeroizing::new([42u8; TOKEN_SECRET_SIZE])
    }

    pub fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(TEST_HASH_ITERATIONS).expect("Invalid test work factor")
    }

    /// Every service wired over in-memory repositories
    pub struct ServiceHarness {
        pub repos: MockRepositories,
        pub catalog: Arc<CatalogService>,
        pub bookings: Arc<BookingService>,
        pub users: Arc<UserService>,
        pub identity: Arc<IdentityService>,
    }

    impl ServiceHarness {
        pub fn new() -> Self {
            Self::with_repos(MockRepositories::new())
        }

        pub fn with_repos(repos: MockRepositories) -> Self {
            let catalog = Arc::new(CatalogService::new(repos.properties.clone()));
            let bookings = Arc::new(BookingService::new(repos.bookings.clone(), catalog.clone()));
            let users = Arc::new(UserService::new(repos.users.clone()));
            let identity = Arc::new(IdentityService::new(
                repos.users.clone(),
                repos.credentials.clone(),
                test_hasher(),
                TokenSigner::new(test_secret(), 3600),
            ));

            Self {
                repos,
                catalog,
                bookings,
                users,
                identity,
            }
        }
    }

    impl Default for ServiceHarness {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// HTTP test helpers
pub mod http {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use stayhub_gateway::{build_router, AppState, DependenciesBuilder};
    use stayhub_storage::Database;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use crate::services::{test_hasher, test_secret};

    /// Router over a fresh in-memory SQLite database
    pub struct TestApp {
        pub router: Router,
        pub db: Arc<Mutex<Database>>,
    }

    impl TestApp {
        pub fn new() -> Self {
            Self::with_ttl(3600)
        }

        pub fn with_ttl(token_ttl_secs: i64) -> Self {
            let db = Arc::new(Mutex::new(
                Database::open_in_memory().expect("Failed to open in-memory database"),
            ));
            let deps = DependenciesBuilder::new()
                .with_database(db.clone())
                .with_token_secret(test_secret())
                .with_token_ttl_secs(token_ttl_secs)
                .with_password_hasher(test_hasher())
                .build()
                .expect("Failed to build dependencies");
            Self {
                router: build_router(AppState::from_dependencies(&deps), true),
                db,
            }
        }

        /// Registration only creates guests; admins are made in the database
        pub async fn promote_to_admin(&self, user_id: &str) {
            let db = self.db.lock().await;
            db.connection()
                .execute("UPDATE users SET role = 'admin' WHERE id = ?1", [user_id])
                .expect("Failed to promote user");
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }

    fn build_request(
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request")
    }

    /// Send a prepared request and return status plus parsed JSON body
    pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Send one request and return status plus parsed JSON body
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send_request(app, build_request(method, uri, token, body)).await
    }

    /// POST as if the connection came from `client`, the way `axum::serve`
    /// with connect info tags requests
    pub async fn post_from(
        app: &Router,
        client: SocketAddr,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut request = build_request(Method::POST, uri, None, Some(body));
        request.extensions_mut().insert(ConnectInfo(client));
        send_request(app, request).await
    }

    pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send(app, Method::GET, uri, token, None).await
    }

    pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        send(app, Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send(app, Method::DELETE, uri, token, None).await
    }

    /// Register a user and return `(user_id, token)`
    pub async fn register(app: &Router, email: &str, password: &str) -> (String, String) {
        let (status, body) = post(
            app,
            "/api/auth/register",
            None,
            serde_json::json!({
                "email": email,
                "password": password,
                "firstName": "Test",
                "lastName": "User",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["user"]["id"].as_str().unwrap_or_default().to_string(),
            body["token"].as_str().unwrap_or_default().to_string(),
        )
    }
}

/// Database test helpers
pub mod db {
    use stayhub_storage::Database;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Database file name
    const DB_FILE: &str = "stayhub.db";

    /// Create a temporary database for testing
    pub struct TestDatabase {
        pub db: Database,
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestDatabase {
        /// Create a new test database in a temporary directory
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let db_path = temp_dir.path().join(DB_FILE);
            let db = Database::open(&db_path).expect("Failed to open test database");
            Self {
                db,
                db_path,
                _temp_dir: temp_dir,
            }
        }

        /// Get the full database file path
        pub fn db_path(&self) -> &Path {
            &self.db_path
        }
    }

    impl Default for TestDatabase {
        fn default() -> Self {
            Self::new()
        }
    }
}
