use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_USERNAME_LEN: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// A logged-in browser (or CLI) identified by an opaque token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: &User) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            created_at: Utc::now(),
        }
    }
}
