//! Shared handler state

use std::sync::Arc;

use axum::extract::FromRef;
use stayhub_core::{BookingService, CatalogService, UserService};

use super::AppDependencies;
use crate::auth::{Authenticator, IdentityService, TokenSigner};

/// Services shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub bookings: Arc<BookingService>,
    pub users: Arc<UserService>,
    pub identity: Arc<IdentityService>,
}

impl AppState {
    /// Wire services on top of the injected repositories
    pub fn from_dependencies(deps: &AppDependencies) -> Self {
        let catalog = Arc::new(CatalogService::new(deps.property_repo.clone()));
        let bookings = Arc::new(BookingService::new(
            deps.booking_repo.clone(),
            catalog.clone(),
        ));
        let users = Arc::new(UserService::new(deps.user_repo.clone()));
        let identity = Arc::new(IdentityService::new(
            deps.user_repo.clone(),
            deps.credential_repo.clone(),
            deps.password_hasher.clone(),
            TokenSigner::new(deps.token_secret.clone(), deps.token_ttl_secs),
        ));

        Self {
            catalog,
            bookings,
            users,
            identity,
        }
    }
}

impl FromRef<AppState> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}
