//! SQLite-backed translation store.
//!
//! Opened in WAL mode with a bounded busy timeout: concurrent readers and
//! writers are served by SQLite itself, and lock contention beyond the
//! timeout surfaces as an error instead of blocking indefinitely.

use super::models::{CacheEntry, CacheKey, SourceEntry};
use super::schema::TRANSLATION_CACHE_VERSIONED_SCHEMAS;
use super::trait_def::TranslationStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_millis(1000);

pub struct SqliteTranslationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTranslationStore {
    /// Open an existing database or create a new one with the current schema.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                &db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(&db_path)?;
            TRANSLATION_CACHE_VERSIONED_SCHEMAS
                .last()
                .context("No schemas defined")?
                .create(&conn)?;
            info!("Created new translation cache database at {:?}", db_path.as_ref());
            conn
        };

        Self::apply_pragmas(&conn)?;

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Translation cache database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        let schema_count = TRANSLATION_CACHE_VERSIONED_SCHEMAS.len();
        if version >= schema_count {
            bail!(
                "Translation cache database version {} is too new (max supported: {})",
                version,
                schema_count - 1
            );
        }

        TRANSLATION_CACHE_VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteTranslationStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store for testing.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        TRANSLATION_CACHE_VERSIONED_SCHEMAS
            .last()
            .context("No schemas defined")?
            .create(&conn)?;
        Ok(SqliteTranslationStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn apply_pragmas(conn: &Connection) -> Result<()> {
        // Write-ahead logging for crash safety and concurrent readers.
        // The pragma returns the resulting mode as a row, so query_row it.
        conn.query_row("PRAGMA journal_mode = WAL;", [], |_row| Ok(()))
            .context("Failed to enable WAL mode")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
    }

    fn migrate_if_needed(conn: &Connection, current_version: usize) -> Result<()> {
        let target_version = TRANSLATION_CACHE_VERSIONED_SCHEMAS.len() - 1;
        if current_version >= target_version {
            return Ok(());
        }

        info!(
            "Migrating translation cache database from version {} to {}",
            current_version, target_version
        );

        for schema in TRANSLATION_CACHE_VERSIONED_SCHEMAS
            .iter()
            .skip(current_version + 1)
        {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Running translation cache migration to version {}",
                    schema.version
                );
                migration_fn(conn)?;
            }
        }

        conn.execute(
            &format!(
                "PRAGMA user_version = {}",
                BASE_DB_VERSION + target_version
            ),
            [],
        )?;
        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CacheEntry> {
        Ok(CacheEntry {
            id: row.get("id")?,
            engine: row.get("engine")?,
            engine_params: row.get("engine_params")?,
            source_text: row.get("source_text")?,
            translation: row.get("translation")?,
        })
    }
}

impl TranslationStore for SqliteTranslationStore {
    fn upsert(&self, key: &CacheKey, translation: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT INTO translation_cache (engine, engine_params, source_text, translation)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT (engine, engine_params, source_text)
               DO UPDATE SET translation = excluded.translation"#,
            rusqlite::params![key.engine, key.engine_params, key.source_text, translation],
        )?;
        Ok(())
    }

    fn lookup(&self, key: &CacheKey) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let translation = conn
            .query_row(
                r#"SELECT translation FROM translation_cache
                   WHERE engine = ?1 AND engine_params = ?2 AND source_text = ?3"#,
                rusqlite::params![key.engine, key.engine_params, key.source_text],
                |row| row.get(0),
            )
            .optional()?;
        Ok(translation)
    }

    fn export_entries(&self) -> Result<Vec<SourceEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, source_text FROM translation_cache ORDER BY id")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(SourceEntry {
                    id: row.get(0)?,
                    source_text: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn apply_correction(&self, id: i64, translation: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE translation_cache SET translation = ?1 WHERE id = ?2",
            rusqlite::params![translation, id],
        )?;
        Ok(changed > 0)
    }

    fn entry_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM translation_cache", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn dump_entries(&self) -> Result<Vec<CacheEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM translation_cache ORDER BY id")?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}
