//! Review entity (read-only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub property_id: String,
    pub user_id: String,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Reviewer's first name, joined from users
    pub reviewer_first_name: String,
    /// Reviewer's last name, joined from users
    pub reviewer_last_name: String,
}
