use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{LiftoffError, Result};
use crate::store::PreferenceStore;

pub struct SqlitePreferenceStore {
    conn: Mutex<Connection>,
}

impl SqlitePreferenceStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| LiftoffError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            LiftoffError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn get_text(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT text_value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn get_integer(&self, key: &str) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT int_value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn put(&self, key: &str, text: Option<&str>, int: Option<i64>) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO preferences (key, text_value, int_value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                text_value = excluded.text_value,
                int_value = excluded.int_value,
                updated_at = excluded.updated_at",
            params![key, text, int, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get_string(&self, key: &str) -> Result<String> {
        Ok(self.get_text(key)?.unwrap_or_default())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, Some(value), None)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn get_bool(&self, key: &str) -> Result<bool> {
        Ok(self.get_integer(key)?.map(|v| v != 0).unwrap_or(false))
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.put(key, None, Some(value as i64))
    }

    fn get_int(&self, key: &str) -> Result<i64> {
        Ok(self.get_integer(key)?.unwrap_or(-1))
    }

    fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.put(key, None, Some(value))
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM preferences", [])?;
        Ok(())
    }
}
