//! Profile payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stayhub_core::{ProfileUpdate, Role, User};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(r: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdatedResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
