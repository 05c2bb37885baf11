//! Errors raised while bringing up the PostgreSQL pool

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The configured connection URL does not parse
    #[error("Invalid database URL: {0}")]
    InvalidUrl(#[source] SqlxError),

    /// The pool could not open a connection within the timeout
    #[error("Could not connect to PostgreSQL: {0}")]
    Connect(#[source] SqlxError),

    #[error("Schema migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
