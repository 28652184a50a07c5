//! # StayHub Core Library
//!
//! Domain logic, entities, and business rules for StayHub.
//!
//! ## Modules
//!
//! - `domain` - Core entities (User, Property, Room, Booking, Review)
//! - `error` - Service error taxonomy shared by every operation
//! - `repository` - Data access traits
//! - `service` - Domain services (bookings, catalog, profiles)

pub mod domain;
pub mod error;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use domain::*;
pub use error::{ServiceError, ServiceResult};
pub use repository::*;
pub use service::*;
