//! Session persistence through the SQLite store and route resolution on top of it.

use tempfile::TempDir;

use devthoughts::db;
use devthoughts::session::guard::{resolve, Resolved};
use devthoughts::session::{KeyValueStore, Route, SessionEvent, SessionStore, SqliteStore};

#[test]
fn test_session_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.db");

    {
        let session = SessionStore::open(&path).unwrap();
        session.login("abc123", Some("alice")).unwrap();
    }

    let reopened = SessionStore::open(&path).unwrap();
    assert!(reopened.is_authenticated());
    assert_eq!(reopened.token().unwrap().as_deref(), Some("abc123"));
    assert_eq!(reopened.username().unwrap().as_deref(), Some("alice"));
}

#[test]
fn test_logout_persists() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.db");

    let session = SessionStore::open(&path).unwrap();
    session.login("abc123", Some("alice")).unwrap();
    session.logout().unwrap();

    let reopened = SessionStore::open(&path).unwrap();
    assert!(!reopened.is_authenticated());
    assert_eq!(reopened.username().unwrap(), None);
}

#[test]
fn test_relogin_without_username_drops_stale_name() {
    let temp_dir = TempDir::new().unwrap();
    let session = SessionStore::open(&temp_dir.path().join("session.db")).unwrap();

    session.login("first", Some("alice")).unwrap();
    session.login("second", None).unwrap();

    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.token.as_deref(), Some("second"));
    assert_eq!(snapshot.username, None);
}

#[test]
fn test_empty_token_row_is_not_a_session() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.db");

    let store = SqliteStore::open(&path).unwrap();
    store.set("token", "").unwrap();

    let session = SessionStore::open(&path).unwrap();
    assert!(!session.is_authenticated());
}

#[test]
fn test_migrations_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let pool = db::create_pool(&temp_dir.path().join("session.db")).unwrap();

    db::run_migrations(&pool).unwrap();
    db::run_migrations(&pool).unwrap();

    let conn = pool.get().unwrap();
    let applied: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
        .unwrap();
    assert_eq!(applied, db::MIGRATIONS.len() as i64);
}

#[tokio::test]
async fn test_clones_share_state_and_events() {
    let temp_dir = TempDir::new().unwrap();
    let session = SessionStore::open(&temp_dir.path().join("session.db")).unwrap();
    let other = session.clone();
    let mut events = other.subscribe();

    session.login("tok", Some("bob")).unwrap();

    assert!(other.is_authenticated());
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::LoggedIn {
            username: Some("bob".to_string())
        }
    );
}

#[test]
fn test_resolve_follows_session() {
    let temp_dir = TempDir::new().unwrap();
    let session = SessionStore::open(&temp_dir.path().join("session.db")).unwrap();

    assert_eq!(
        resolve(&session, "/user/alice").unwrap(),
        Resolved::Redirect(Route::Login)
    );

    session.login("tok", Some("alice")).unwrap();
    assert_eq!(
        resolve(&session, "/user/alice").unwrap(),
        Resolved::Render(Route::User("alice".to_string()))
    );
}
