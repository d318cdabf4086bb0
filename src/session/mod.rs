pub mod guard;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::ClientResult;

pub use guard::{Authenticated, Gate, Resolved, Route};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: Option<String> },
    LoggedOut,
}

/// Point-in-time copy of what is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub username: Option<String>,
}

/// `token` and `username` in persistent storage, plus a channel of login changes.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { storage, events }
    }

    /// Open the SQLite-backed session at `path`, creating it if needed.
    pub fn open(path: &Path) -> ClientResult<Self> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// True iff a non-empty token is persisted. The token is not validated.
    pub fn is_authenticated(&self) -> bool {
        match self.token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                tracing::warn!("Could not read session token: {}", e);
                false
            }
        }
    }

    pub fn token(&self) -> ClientResult<Option<String>> {
        self.read(TOKEN_KEY)
    }

    pub fn username(&self) -> ClientResult<Option<String>> {
        self.read(USERNAME_KEY)
    }

    pub fn snapshot(&self) -> ClientResult<Session> {
        Ok(Session {
            token: self.token()?,
            username: self.username()?,
        })
    }

    /// Persist a new token (and username when known) and notify subscribers.
    ///
    /// Without a username any previously stored one is dropped, so a stale
    /// name never outlives the token it came with. Both keys are written
    /// together; on error neither changes and nobody is notified.
    pub fn login(&self, token: &str, username: Option<&str>) -> ClientResult<()> {
        self.storage
            .apply(&[(TOKEN_KEY, Some(token)), (USERNAME_KEY, username)])?;

        tracing::info!(username = username.unwrap_or("-"), "Session started");
        self.notify(SessionEvent::LoggedIn {
            username: username.map(str::to_string),
        });
        Ok(())
    }

    /// Clear token and username and notify subscribers.
    pub fn logout(&self) -> ClientResult<()> {
        self.storage.apply(&[(TOKEN_KEY, None), (USERNAME_KEY, None)])?;

        tracing::info!("Session cleared");
        self.notify(SessionEvent::LoggedOut);
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn read(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.storage.get(key)?.filter(|v| !v.is_empty()))
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authenticated_before_login() {
        let session = SessionStore::in_memory();
        assert!(!session.is_authenticated());
        assert_eq!(session.token().unwrap(), None);
    }

    #[test]
    fn authenticated_immediately_after_login() {
        let session = SessionStore::in_memory();
        session.login("abc123", None).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn logout_clears_everything() {
        let session = SessionStore::in_memory();
        session.login("abc123", Some("alice")).unwrap();
        session.logout().unwrap();

        assert_eq!(session.token().unwrap(), None);
        assert_eq!(session.username().unwrap(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_writes_both_keys_to_storage() {
        let storage = Arc::new(MemoryStore::new());
        let session = SessionStore::new(storage.clone());
        session.login("abc123", Some("alice")).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("abc123"));
        assert_eq!(storage.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn login_without_username_drops_stale_one() {
        let session = SessionStore::in_memory();
        session.login("first", Some("alice")).unwrap();
        session.login("second", None).unwrap();
        assert_eq!(session.username().unwrap(), None);
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(TOKEN_KEY, "").unwrap();
        let session = SessionStore::new(storage);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn subscribers_see_login_and_logout() {
        let session = SessionStore::in_memory();
        let mut rx = session.subscribe();

        session.login("abc123", Some("alice")).unwrap();
        session.logout().unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::LoggedIn {
                username: Some("alice".to_string())
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::LoggedOut);
    }

    /// Storage that refuses to write the username.
    struct FailingUsernameStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for FailingUsernameStore {
        fn get(&self, key: &str) -> ClientResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> ClientResult<()> {
            if key == USERNAME_KEY {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> ClientResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_login_leaves_no_token_and_no_event() {
        let storage = Arc::new(FailingUsernameStore {
            inner: MemoryStore::new(),
        });
        let session = SessionStore::new(storage.clone());
        let mut rx = session.subscribe();

        assert!(session.login("abc123", Some("alice")).is_err());

        assert!(!session.is_authenticated());
        assert_eq!(storage.inner.get(TOKEN_KEY).unwrap(), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failed_relogin_keeps_previous_token() {
        let storage = Arc::new(FailingUsernameStore {
            inner: MemoryStore::new(),
        });
        storage.inner.set(TOKEN_KEY, "old").unwrap();
        let session = SessionStore::new(storage);

        assert!(session.login("new", Some("alice")).is_err());
        assert_eq!(session.token().unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn clones_share_storage_and_events() {
        let session = SessionStore::in_memory();
        let other = session.clone();
        let mut rx = other.subscribe();

        session.login("abc123", None).unwrap();
        assert!(other.is_authenticated());
        assert!(rx.try_recv().is_ok());
    }
}
