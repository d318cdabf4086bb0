use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, OptionalExtension};

use crate::db::{self, DbPool};
use crate::error::ClientResult;

/// Persistent string key-value storage that outlives the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;

    /// Apply several writes as one: `Some` sets, `None` removes. Either all
    /// of them land or none do.
    ///
    /// The default applies them in order and, on failure, puts back what
    /// was there before. Stores with real transactions override it.
    fn apply(&self, writes: &[(&str, Option<&str>)]) -> ClientResult<()> {
        let mut previous: Vec<(&str, Option<String>)> = Vec::with_capacity(writes.len());
        for &(key, value) in writes {
            let before = self.get(key)?;
            let result = match value {
                Some(v) => self.set(key, v),
                None => self.remove(key),
            };
            if let Err(e) = result {
                for (key, before) in previous.into_iter().rev() {
                    let restored = match &before {
                        Some(v) => self.set(key, v),
                        None => self.remove(key),
                    };
                    if let Err(undo) = restored {
                        tracing::error!(key, error = %undo, "Could not roll back session write");
                    }
                }
                return Err(e);
            }
            previous.push((key, before));
        }
        Ok(())
    }
}

const UPSERT: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET
       value = excluded.value,
       updated_at = datetime('now')";

/// SQLite-backed store, one row per key.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> ClientResult<Self> {
        let pool = db::create_pool(path)?;
        db::run_migrations(&pool)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: DbPool) -> ClientResult<Self> {
        db::run_migrations(&pool)?;
        Ok(Self { pool })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let conn = self.pool.get()?;
        conn.execute(UPSERT, params![key, value])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn apply(&self, writes: &[(&str, Option<&str>)]) -> ClientResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        for &(key, value) in writes {
            match value {
                Some(v) => tx.execute(UPSERT, params![key, v])?,
                None => tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?,
            };
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local store for tests and one-shot sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    fn apply(&self, writes: &[(&str, Option<&str>)]) -> ClientResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for &(key, value) in writes {
            match value {
                Some(v) => entries.insert(key.to_string(), v.to_string()),
                None => entries.remove(key),
            };
        }
        Ok(())
    }
}
