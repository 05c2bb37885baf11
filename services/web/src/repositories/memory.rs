//! In-memory stores used by the HTTP tests

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use super::{LATEST_SNIPPETS, ModelError, SnippetStore, UserStore};
use crate::{
    models::{Snippet, User},
    password,
};

fn is_live(snippet: &Snippet, now: DateTime<Utc>) -> bool {
    snippet.expires >= now
}

#[derive(Default)]
pub struct MemorySnippetStore {
    snippets: Mutex<Vec<Snippet>>,
}

impl MemorySnippetStore {
    /// Store a snippet with explicit timestamps, bypassing validation
    pub async fn insert_raw(
        &self,
        title: &str,
        content: &str,
        created: DateTime<Utc>,
        expires: DateTime<Utc>,
    ) -> i64 {
        let mut snippets = self.snippets.lock().await;
        let id = snippets.len() as i64 + 1;
        snippets.push(Snippet {
            id,
            title: title.to_string(),
            content: content.to_string(),
            created,
            expires,
        });
        id
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i64,
    ) -> Result<i64, ModelError> {
        let created = Utc::now();
        let expires = created + TimeDelta::days(expires_days);
        Ok(self.insert_raw(title, content, created, expires).await)
    }

    async fn get(&self, id: i64) -> Result<Snippet, ModelError> {
        let now = Utc::now();
        self.snippets
            .lock()
            .await
            .iter()
            .find(|snippet| snippet.id == id && is_live(snippet, now))
            .cloned()
            .ok_or(ModelError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let now = Utc::now();
        Ok(self
            .snippets
            .lock()
            .await
            .iter()
            .rev()
            .filter(|snippet| is_live(snippet, now))
            .take(LATEST_SNIPPETS as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned()
    }

    pub async fn remove(&self, id: i64) {
        self.users.lock().await.retain(|user| user.id != id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<(), ModelError> {
        let hashed_password = password::hash_password(password.to_string()).await?;

        let mut users = self.users.lock().await;
        if users.iter().any(|user| user.email == email) {
            return Err(ModelError::DuplicateEmail);
        }
        let id = users.iter().map(|user| user.id).max().unwrap_or(0) + 1;
        users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            hashed_password,
            created: Utc::now(),
        });
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let Some(user) = self.find_by_email(email).await else {
            return Err(ModelError::InvalidCredentials);
        };

        if password::verify_password(password.to_string(), user.hashed_password).await? {
            Ok(user.id)
        } else {
            Err(ModelError::InvalidCredentials)
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, ModelError> {
        Ok(self.users.lock().await.iter().any(|user| user.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snippet_expiry_boundaries() {
        let store = MemorySnippetStore::default();
        let now = Utc::now();
        let expired = store
            .insert_raw("old", "old", now - TimeDelta::days(2), now - TimeDelta::seconds(1))
            .await;
        let live = store.insert("T", "C", 1).await.unwrap();

        assert!(matches!(store.get(expired).await, Err(ModelError::NoRecord)));
        assert!(matches!(store.get(999_999).await, Err(ModelError::NoRecord)));
        assert_eq!(store.get(live).await.unwrap().title, "T");
    }

    #[tokio::test]
    async fn test_latest_skips_expired_and_caps_at_ten() {
        let store = MemorySnippetStore::default();
        let now = Utc::now();
        for n in 0..12 {
            store.insert(&format!("live {}", n), "C", 7).await.unwrap();
        }
        let expired = store
            .insert_raw("old", "old", now - TimeDelta::days(2), now - TimeDelta::days(1))
            .await;

        let latest = store.latest().await.unwrap();

        assert_eq!(latest.len(), 10);
        assert!(latest.iter().all(|snippet| snippet.id != expired));
        assert!(latest.windows(2).all(|pair| pair[0].id > pair[1].id));
        assert_eq!(latest[0].title, "live 11");
    }

    #[tokio::test]
    async fn test_authenticate_errors_are_indistinguishable() {
        let store = MemoryUserStore::default();
        store.insert("Ada", "ada@x.com", "longenough1").await.unwrap();

        let wrong_password = store.authenticate("ada@x.com", "nope").await.unwrap_err();
        let unknown_email = store.authenticate("eve@x.com", "longenough1").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, ModelError::InvalidCredentials));
        assert!(matches!(unknown_email, ModelError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_email_writes_nothing() {
        let store = MemoryUserStore::default();
        store.insert("Ada", "ada@x.com", "longenough1").await.unwrap();

        let result = store.insert("Eve", "ada@x.com", "otherpassword").await;

        assert!(matches!(result, Err(ModelError::DuplicateEmail)));
        assert_eq!(store.count().await, 1);
        assert_eq!(store.find_by_email("ada@x.com").await.unwrap().name, "Ada");
    }
}
