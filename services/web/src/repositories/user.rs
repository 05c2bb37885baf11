//! User repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use common::database::USERS_EMAIL_CONSTRAINT;
use sqlx::PgPool;
use tracing::info;

use super::{ModelError, UserStore};
use crate::{models::User, password};

/// User repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ModelError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, hashed_password, created
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// True when the error is the unique violation on `users.email`
fn is_duplicate_email(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(USERS_EMAIL_CONSTRAINT)
        }
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let hashed_password = password::hash_password(password.to_string()).await?;

        sqlx::query(
            r#"
            INSERT INTO users (name, email, hashed_password, created)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&hashed_password)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate_email(&e) {
                ModelError::DuplicateEmail
            } else {
                ModelError::Database(e)
            }
        })?;

        info!("Created user {}", name);
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Err(ModelError::InvalidCredentials);
        };

        if password::verify_password(password.to_string(), user.hashed_password).await? {
            Ok(user.id)
        } else {
            Err(ModelError::InvalidCredentials)
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ModelError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT true FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
