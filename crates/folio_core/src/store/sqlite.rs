//! SQLite-backed key-value backend.
//!
//! # Responsibility
//! - Persist slots in the `kv_slots` table of a migrated connection.
//! - Detect slots changed by other connections and signal them.
//!
//! # Invariants
//! - Every connection is one context; its own commits never signal itself.
//! - Revisions come from the shared `kv_clock` counter, so every value
//!   change (including re-creating a removed slot) gets a revision no
//!   connection has seen before.
//! - Quota checks and writes run in one transaction.

use super::{entry_bytes, KeyValueStore, StorageError, StoreResult, Subscription};
use super::DEFAULT_QUOTA_BYTES;
use crate::notify::registry::HandlerRegistry;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Slot store over a borrowed SQLite connection.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
    quota_bytes: usize,
    available: Cell<bool>,
    known_revisions: RefCell<BTreeMap<String, i64>>,
    data_version: Cell<i64>,
    external: HandlerRegistry<str>,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// Snapshots current slot revisions so pre-existing data is not reported
    /// as an external change.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        Self::with_quota(conn, DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(conn: &'conn Connection, quota_bytes: usize) -> StoreResult<Self> {
        let store = Self {
            conn,
            quota_bytes,
            available: Cell::new(true),
            known_revisions: RefCell::new(BTreeMap::new()),
            data_version: Cell::new(0),
            external: HandlerRegistry::new(),
        };
        store.data_version.set(store.read_data_version()?);
        *store.known_revisions.borrow_mut() = store.read_revisions()?;
        Ok(store)
    }

    /// Simulates storage being disabled for this context.
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    fn read_data_version(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("PRAGMA data_version;", [], |row| row.get(0))
    }

    fn read_revisions(&self) -> rusqlite::Result<BTreeMap<String, i64>> {
        let mut stmt = self.conn.prepare("SELECT key, revision FROM kv_slots;")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?;
        let revisions = rows.collect::<rusqlite::Result<BTreeMap<String, i64>>>()?;
        Ok(revisions)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let others: i64 = tx.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv_slots
             WHERE key != ?1;",
            [key],
            |row| row.get(0),
        )?;
        let bytes = usize::try_from(others).unwrap_or(usize::MAX) + entry_bytes(key, value);
        if bytes > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes,
                quota: self.quota_bytes,
            });
        }

        let current: Option<String> = tx
            .query_row("SELECT value FROM kv_slots WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        if current.as_deref() == Some(value) {
            return Ok(());
        }

        tx.execute("UPDATE kv_clock SET revision = revision + 1 WHERE id = 1;", [])?;
        let revision: i64 =
            tx.query_row("SELECT revision FROM kv_clock WHERE id = 1;", [], |row| {
                row.get(0)
            })?;
        tx.execute(
            "INSERT INTO kv_slots (key, value, revision, updated_at)
             VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = excluded.revision,
                updated_at = excluded.updated_at;",
            params![key, value, revision],
        )?;
        tx.commit()?;

        self.known_revisions
            .borrow_mut()
            .insert(key.to_string(), revision);
        Ok(())
    }

    fn poll_changed_keys(&self) -> rusqlite::Result<Vec<String>> {
        let version = self.read_data_version()?;
        if version == self.data_version.get() {
            return Ok(Vec::new());
        }
        self.data_version.set(version);

        let current = self.read_revisions()?;
        let mut known = self.known_revisions.borrow_mut();
        let mut changed: Vec<String> = current
            .iter()
            .filter(|(key, revision)| known.get(key.as_str()) != Some(revision))
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            known
                .keys()
                .filter(|key| !current.contains_key(key.as_str()))
                .cloned(),
        );
        *known = current;
        Ok(changed)
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> Option<String> {
        if !self.available.get() {
            return None;
        }
        let result = self
            .conn
            .query_row("SELECT value FROM kv_slots WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional();
        match result {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=slot_read module=store status=error backend=sqlite key={} error={}",
                    key, err
                );
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if !self.available.get() {
            return Err(StorageError::Unavailable);
        }
        self.write(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        if !self.available.get() {
            return Err(StorageError::Unavailable);
        }
        self.conn
            .execute("DELETE FROM kv_slots WHERE key = ?1;", [key])?;
        self.known_revisions.borrow_mut().remove(key);
        Ok(())
    }

    fn subscribe_external(&self, handler: Box<dyn Fn(&str)>) -> Subscription {
        self.external.subscribe(handler)
    }

    fn dispatch_external_changes(&self) -> usize {
        let keys = match self.poll_changed_keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(
                    "event=external_change module=store status=error backend=sqlite error={}",
                    err
                );
                return 0;
            }
        };
        for key in &keys {
            debug!(
                "event=external_change module=store status=ok backend=sqlite key={}",
                key
            );
            self.external.emit(key.as_str());
        }
        keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::db::{open_db, open_db_in_memory};
    use crate::store::{KeyValueStore, StorageError};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn set_get_remove_roundtrip() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::try_new(&conn).unwrap();

        assert_eq!(store.get("darkMode"), None);
        store.set("darkMode", "true").unwrap();
        assert_eq!(store.get("darkMode").as_deref(), Some("true"));
        store.remove("darkMode").unwrap();
        assert_eq!(store.get("darkMode"), None);
    }

    #[test]
    fn quota_rejection_keeps_previous_value() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::with_quota(&conn, 12).unwrap();
        store.set("key", "value").unwrap();

        let err = store.set("key", "a much longer value").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 12, .. }));
        assert_eq!(store.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn commits_from_another_connection_are_signalled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.db");
        let conn_a = open_db(&path).unwrap();
        let conn_b = open_db(&path).unwrap();
        let tab_a = SqliteKvStore::try_new(&conn_a).unwrap();
        let tab_b = SqliteKvStore::try_new(&conn_b).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = tab_b.subscribe_external(Box::new(move |key: &str| {
            sink.borrow_mut().push(key.to_string())
        }));

        tab_b.set("portfolioProfileImage", "data:image/png;base64,AA==").unwrap();
        assert_eq!(tab_b.dispatch_external_changes(), 0);

        tab_a.set("portfolioProjects", "[]").unwrap();
        // tab A only hears about tab B's profile image write.
        assert_eq!(tab_a.dispatch_external_changes(), 1);
        assert_eq!(tab_b.dispatch_external_changes(), 1);
        assert_eq!(seen.borrow().as_slice(), ["portfolioProjects".to_string()]);

        tab_a.remove("portfolioProfileImage").unwrap();
        assert_eq!(tab_b.dispatch_external_changes(), 1);
        assert_eq!(tab_b.get("portfolioProfileImage"), None);
    }

    #[test]
    fn recreating_a_removed_slot_is_signalled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.db");
        let conn_a = open_db(&path).unwrap();
        let conn_b = open_db(&path).unwrap();
        let tab_a = SqliteKvStore::try_new(&conn_a).unwrap();
        let tab_b = SqliteKvStore::try_new(&conn_b).unwrap();

        tab_a.set("darkMode", "false").unwrap();
        assert_eq!(tab_b.dispatch_external_changes(), 1);

        tab_a.remove("darkMode").unwrap();
        tab_a.set("darkMode", "true").unwrap();
        assert_eq!(tab_b.dispatch_external_changes(), 1);
        assert_eq!(tab_b.get("darkMode").as_deref(), Some("true"));
    }

    #[test]
    fn rewriting_identical_value_does_not_signal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.db");
        let conn_a = open_db(&path).unwrap();
        let conn_b = open_db(&path).unwrap();
        let tab_a = SqliteKvStore::try_new(&conn_a).unwrap();
        tab_a.set("darkMode", "false").unwrap();
        let tab_b = SqliteKvStore::try_new(&conn_b).unwrap();

        tab_a.set("darkMode", "false").unwrap();
        assert_eq!(tab_b.dispatch_external_changes(), 0);
    }
}
