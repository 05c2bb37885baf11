//! User model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// User entity
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// PHC-format password hash, never the plaintext
    pub hashed_password: String,
    pub created: DateTime<Utc>,
}
