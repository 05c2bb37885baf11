//! Snippet model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Expiry periods, in days, a snippet can be created with
pub const PERMITTED_EXPIRY_DAYS: [i64; 3] = [1, 7, 365];

/// Snippet entity
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}
