//! Domain services
//!
//! Each service owns the business rules for one area and talks to storage
//! only through repository traits injected at construction.

mod booking_service;
mod catalog_service;
mod user_service;

pub use booking_service::BookingService;
pub use catalog_service::CatalogService;
pub use user_service::UserService;
