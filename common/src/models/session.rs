// common/src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal user identity kept server-side for a logged-in browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub first_name: String,
    pub email: String,
    pub user_id: String,
    /// Timestamp when the session was created at login
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(first_name: String, email: String, user_id: String) -> Self {
        Self {
            first_name,
            email,
            user_id,
            created_at: Utc::now(),
        }
    }

    /// Sessions are written once at login, so age is measured from creation
    pub fn is_expired(&self, ttl_seconds: i64) -> bool {
        let age = Utc::now().signed_duration_since(self.created_at);
        age.num_seconds() > ttl_seconds
    }
}
