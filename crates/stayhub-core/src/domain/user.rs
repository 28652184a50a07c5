//! User entity, roles and the per-request caller identity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Closed set of roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Role::Guest),
            "admin" => Ok(Role::Admin),
            other => Err(anyhow::anyhow!("Unknown role: {}", other)),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,

    /// Login email, stored lowercase and unique
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    pub role: Role,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new guest user
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(&email.into()),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: Role::Guest,
            created_at: Utc::now(),
        }
    }

    /// Set the role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Apply a partial profile update
    pub fn apply(&mut self, changes: ProfileUpdate) {
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = changes.email {
            self.email = normalize_email(&email);
        }
    }
}

/// Partial update of the caller's own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Stored password material for a user, owned by the identity service.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordCredential {
    pub user_id: String,
    /// Encoded password hash (`iterations$salt$hash`, hex)
    pub password_hash: String,
    /// Bumped on every password change; tokens carrying an older version are revoked
    pub token_version: i64,
    pub updated_at: DateTime<Utc>,
}

impl PasswordCredential {
    pub fn new(user_id: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password_hash: password_hash.into(),
            token_version: 1,
            updated_at: Utc::now(),
        }
    }

    /// Replace the hash and revoke every token issued so far
    pub fn rotate(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.token_version += 1;
        self.updated_at = Utc::now();
    }
}

/// Identity resolved by the access gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Guest => false,
        }
    }

    /// Fails with `Forbidden` unless the caller is an admin
    pub fn require_admin(&self) -> ServiceResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Admin access required"))
        }
    }

    /// Owner-or-admin rule used for bookings and properties
    pub fn can_act_for(&self, owner_id: &str) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(user.id.clone(), user.role)
    }
}

/// Emails compare case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
