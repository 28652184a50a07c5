//! User service - profile read and update

use std::sync::Arc;

use tracing::info;

use crate::domain::{normalize_email, Caller, ProfileUpdate, User};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{EmailTaken, UserRepository};

const EMAIL_IN_USE: &str = "Email is already in use";

/// Service for the caller's own profile
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new UserService
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// The caller's profile
    pub async fn profile(&self, caller: &Caller) -> ServiceResult<User> {
        self.users
            .get(&caller.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    /// Partial update of name and email. Emails stay unique.
    pub async fn update_profile(
        &self,
        caller: &Caller,
        changes: ProfileUpdate,
    ) -> ServiceResult<User> {
        let mut user = self.profile(caller).await?;

        if let Some(email) = changes.email.as_deref() {
            let email = normalize_email(email);
            if !email.contains('@') {
                return Err(ServiceError::invalid("Invalid email address"));
            }
            if let Some(other) = self.users.get_by_email(&email).await? {
                if other.id != user.id {
                    return Err(ServiceError::conflict(EMAIL_IN_USE));
                }
            }
        }
        for name in [&changes.first_name, &changes.last_name].into_iter().flatten() {
            if name.trim().is_empty() {
                return Err(ServiceError::invalid("Name cannot be empty"));
            }
        }

        user.apply(changes);
        // A concurrent update can still claim the address after the check above
        self.users.update(&user).await.map_err(|e| {
            if e.is::<EmailTaken>() {
                ServiceError::conflict(EMAIL_IN_USE)
            } else {
                ServiceError::from(e)
            }
        })?;

        info!(user_id = %user.id, "[UserService] Updated profile");

        Ok(user)
    }
}
