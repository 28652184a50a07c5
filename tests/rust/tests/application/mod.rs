//! Application service tests
//!
//! Services wired over in-memory repositories: booking rules, catalogue
//! management, profiles and the identity provider.

mod catalog_service;
