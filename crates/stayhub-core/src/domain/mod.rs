//! Domain entities and value objects
//!
//! This module contains all domain-level types for StayHub:
//! - Entities (User, Property, Room, Booking, Review)
//! - Value Objects (Role, BookingStatus, StayDates, PageRequest)
//! - Request-scoped identity (Caller)

mod booking;
mod property;
mod review;
mod room;
mod user;

pub use booking::*;
pub use property::*;
pub use review::*;
pub use room::*;
pub use user::*;
