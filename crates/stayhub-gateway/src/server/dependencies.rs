//! Dependency Injection Container
//!
//! Everything the server needs is handed in here, so the same router runs
//! against SQLite in production and in-memory repositories in tests.

use std::sync::Arc;

use stayhub_core::{BookingRepository, CredentialRepository, PropertyRepository, UserRepository};
use stayhub_storage::{
    Database, PasswordHasher, SqliteBookingRepository, SqliteCredentialRepository,
    SqlitePropertyRepository, SqliteUserRepository, TOKEN_SECRET_SIZE,
};
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::auth::DEFAULT_TOKEN_TTL_SECS;

/// Dependency container for the server
#[derive(Clone)]
pub struct AppDependencies {
    // Repositories (Data Layer)
    pub user_repo: Arc<dyn UserRepository>,
    pub credential_repo: Arc<dyn CredentialRepository>,
    pub property_repo: Arc<dyn PropertyRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,

    // Identity provider
    pub token_secret: Zeroizing<[u8; TOKEN_SECRET_SIZE]>,
    pub token_ttl_secs: i64,
    pub password_hasher: PasswordHasher,
}

/// Builder for AppDependencies
#[derive(Default)]
pub struct DependenciesBuilder {
    database: Option<Arc<Mutex<Database>>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    credential_repo: Option<Arc<dyn CredentialRepository>>,
    property_repo: Option<Arc<dyn PropertyRepository>>,
    booking_repo: Option<Arc<dyn BookingRepository>>,
    token_secret: Option<Zeroizing<[u8; TOKEN_SECRET_SIZE]>>,
    token_ttl_secs: Option<i64>,
    password_hasher: Option<PasswordHasher>,
}

impl DependenciesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repositories not set explicitly are created on this database
    pub fn with_database(mut self, db: Arc<Mutex<Database>>) -> Self {
        self.database = Some(db);
        self
    }

    pub fn with_user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn with_credential_repo(mut self, repo: Arc<dyn CredentialRepository>) -> Self {
        self.credential_repo = Some(repo);
        self
    }

    pub fn with_property_repo(mut self, repo: Arc<dyn PropertyRepository>) -> Self {
        self.property_repo = Some(repo);
        self
    }

    pub fn with_booking_repo(mut self, repo: Arc<dyn BookingRepository>) -> Self {
        self.booking_repo = Some(repo);
        self
    }

    pub fn with_token_secret(mut self, secret: Zeroizing<[u8; TOKEN_SECRET_SIZE]>) -> Self {
        self.token_secret = Some(secret);
        self
    }

    pub fn with_token_ttl_secs(mut self, ttl: i64) -> Self {
        self.token_ttl_secs = Some(ttl);
        self
    }

    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.password_hasher = Some(hasher);
        self
    }

    pub fn build(self) -> Result<AppDependencies, String> {
        let database = self.database;
        let from_db = |what: &str| format!("{} is required when no database is given", what);

        let user_repo: Arc<dyn UserRepository> = match (self.user_repo, &database) {
            (Some(repo), _) => repo,
            (None, Some(db)) => Arc::new(SqliteUserRepository::new(db.clone())),
            (None, None) => return Err(from_db("user_repo")),
        };
        let credential_repo: Arc<dyn CredentialRepository> =
            match (self.credential_repo, &database) {
                (Some(repo), _) => repo,
                (None, Some(db)) => Arc::new(SqliteCredentialRepository::new(db.clone())),
                (None, None) => return Err(from_db("credential_repo")),
            };
        let property_repo: Arc<dyn PropertyRepository> = match (self.property_repo, &database) {
            (Some(repo), _) => repo,
            (None, Some(db)) => Arc::new(SqlitePropertyRepository::new(db.clone())),
            (None, None) => return Err(from_db("property_repo")),
        };
        let booking_repo: Arc<dyn BookingRepository> = match (self.booking_repo, &database) {
            (Some(repo), _) => repo,
            (None, Some(db)) => Arc::new(SqliteBookingRepository::new(db.clone())),
            (None, None) => return Err(from_db("booking_repo")),
        };

        Ok(AppDependencies {
            user_repo,
            credential_repo,
            property_repo,
            booking_repo,
            token_secret: self.token_secret.ok_or("token_secret is required")?,
            token_ttl_secs: self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            password_hasher: self.password_hasher.unwrap_or_default(),
        })
    }
}
