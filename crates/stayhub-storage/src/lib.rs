//! StayHub Storage Layer
//!
//! SQLite database plus the crypto helpers of the local identity provider.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Core services                        │
//! ├──────────────────────────────────────────────────────┤
//! │               Repository Traits                      │
//! │   (UserRepository, PropertyRepository, Booking...)   │
//! ├──────────────────────────────────────────────────────┤
//! │            SQLite Implementations                    │
//! │  (SqliteUserRepository, SqliteBookingRepository...)  │
//! ├──────────────────────────────────────────────────────┤
//! │                   Database                           │
//! │          (SQLite, numbered migrations)               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use stayhub_storage::{Database, SqliteBookingRepository, SqlitePropertyRepository};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! let db = Arc::new(Mutex::new(Database::open(&path)?));
//! let properties = SqlitePropertyRepository::new(db.clone());
//! let bookings = SqliteBookingRepository::new(db.clone());
//! ```

pub mod crypto;
mod database;
mod repositories;

pub use crypto::{generate_token_secret, PasswordHasher, TOKEN_SECRET_SIZE};
pub use database::Database;
pub use repositories::*;

/// Default database file name.
pub const DATABASE_FILE: &str = "stayhub.db";

/// Get the default database path for the current platform.
pub fn default_database_path() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|p| p.join("stayhub").join(DATABASE_FILE))
}
