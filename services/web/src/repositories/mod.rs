//! Repositories for database operations
//!
//! Handlers talk to storage through the [`SnippetStore`] and [`UserStore`]
//! traits; the PostgreSQL implementations live in [`snippet`] and [`user`].

use async_trait::async_trait;
use thiserror::Error;

use crate::{models::Snippet, password::PasswordError};

#[cfg(test)]
pub mod memory;
pub mod snippet;
pub mod user;

pub use snippet::PgSnippetRepository;
pub use user::PgUserRepository;

/// Number of snippets listed on the home page
pub const LATEST_SNIPPETS: i64 = 10;

/// Errors raised by the model layer
#[derive(Error, Debug)]
pub enum ModelError {
    /// No matching record, or the record has expired
    #[error("No matching record found")]
    NoRecord,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Duplicate email")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Storage operations on snippets
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Store a new snippet expiring `expires_days` days from now and return its id
    async fn insert(&self, title: &str, content: &str, expires_days: i64)
    -> Result<i64, ModelError>;

    /// Fetch a snippet that has not expired yet
    async fn get(&self, id: i64) -> Result<Snippet, ModelError>;

    /// Up to [`LATEST_SNIPPETS`] unexpired snippets, newest id first
    async fn latest(&self) -> Result<Vec<Snippet>, ModelError>;
}

/// Storage operations on users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; fails with [`ModelError::DuplicateEmail`] if the email is taken
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError>;

    /// Resolve credentials to a user id.
    ///
    /// Unknown emails and wrong passwords both yield
    /// [`ModelError::InvalidCredentials`].
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError>;

    async fn exists(&self, id: i64) -> Result<bool, ModelError>;
}
