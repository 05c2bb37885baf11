//! Session state kept for each visitor
//!
//! The store itself (PostgreSQL in production, memory in tests) belongs to
//! `tower-sessions`; this module only owns the keys written into it.

use tower_sessions::{
    Expiry, Session, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
    session::Error,
};
use tracing::info;

use crate::config::SessionConfig;

/// Key holding the id of the logged-in user
pub const AUTHENTICATED_USER_ID_KEY: &str = "authenticated_user_id";
/// Key holding the one-shot notification shown on the next page
pub const FLASH_KEY: &str = "flash";

/// Name of the session cookie
pub const COOKIE_NAME: &str = "session";

/// Session middleware over `store` configured from `config`
pub fn layer<Store>(store: Store, config: &SessionConfig) -> SessionManagerLayer<Store>
where
    Store: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(COOKIE_NAME)
        .with_secure(config.secure_cookie)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::hours(config.lifetime_hours)))
}

/// Queue a message for the next rendered page
pub async fn put_flash(session: &Session, message: &str) -> Result<(), Error> {
    session.insert(FLASH_KEY, message).await
}

/// Take the pending flash message, if any. A message is returned at most once.
pub async fn pop_flash(session: &Session) -> Result<Option<String>, Error> {
    session.remove::<String>(FLASH_KEY).await
}

pub async fn authenticated_user_id(session: &Session) -> Result<Option<i64>, Error> {
    session.get::<i64>(AUTHENTICATED_USER_ID_KEY).await
}

/// Mark the session as belonging to `user_id`.
///
/// The session id is rotated first so a token planted before login is
/// worthless afterwards.
pub async fn login(session: &Session, user_id: i64) -> Result<(), Error> {
    session.cycle_id().await?;
    session.insert(AUTHENTICATED_USER_ID_KEY, user_id).await?;
    info!(user_id, "User logged in");
    Ok(())
}

pub async fn logout(session: &Session) -> Result<(), Error> {
    session.cycle_id().await?;
    let user_id = session.remove::<i64>(AUTHENTICATED_USER_ID_KEY).await?;
    info!(?user_id, "User logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_is_read_once() {
        let session = session();
        put_flash(&session, "Saved!").await.unwrap();

        assert_eq!(pop_flash(&session).await.unwrap().as_deref(), Some("Saved!"));
        assert_eq!(pop_flash(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let session = session();
        assert_eq!(authenticated_user_id(&session).await.unwrap(), None);

        login(&session, 42).await.unwrap();
        assert_eq!(authenticated_user_id(&session).await.unwrap(), Some(42));

        logout(&session).await.unwrap();
        assert_eq!(authenticated_user_id(&session).await.unwrap(), None);
    }
}
