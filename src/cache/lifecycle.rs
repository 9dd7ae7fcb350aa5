//! Physical lifetime of cache database files across process runs.
//!
//! Every run gets its own uniquely named database so concurrent or
//! successive runs never collide. WAL side-files (`-wal`, `-shm`) are
//! created by SQLite next to the main file and are always managed as a
//! unit with it.

use crate::cache_store::SqliteTranslationStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub const CACHE_DB_PREFIX: &str = "cache.v1.";
pub const CACHE_DB_SUFFIX: &str = ".db";
const SIDE_FILE_SUFFIXES: &[&str] = &["-wal", "-shm"];

/// Generate a unique database file name, `cache.v1.<8-hex-random>.db`.
pub fn generate_db_name() -> String {
    format!(
        "{}{:08x}{}",
        CACHE_DB_PREFIX,
        rand::random::<u32>(),
        CACHE_DB_SUFFIX
    )
}

fn is_cache_db_name(name: &str) -> bool {
    let Some(middle) = name
        .strip_prefix(CACHE_DB_PREFIX)
        .and_then(|rest| rest.strip_suffix(CACHE_DB_SUFFIX))
    else {
        return false;
    };
    middle.len() == 8 && middle.chars().all(|c| c.is_ascii_hexdigit())
}

/// Remove a database file together with its side-files. Missing side-files
/// are tolerated; a permission error on an individual file is logged and
/// skipped so the rest of the purge proceeds. Returns whether the main
/// database file is gone afterwards.
fn remove_db_files(db_path: &Path) -> bool {
    let mut targets = vec![(db_path.to_path_buf(), true)];
    for suffix in SIDE_FILE_SUFFIXES {
        let mut side = db_path.as_os_str().to_owned();
        side.push(suffix);
        targets.push((PathBuf::from(side), false));
    }
    let mut main_removed = true;
    for (target, is_main) in targets {
        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!("Failed to remove cache file {:?}: {}", target, err);
                if is_main {
                    main_removed = false;
                }
            }
        }
    }
    main_removed
}

/// Owns per-run database file naming, creation, and purge of stale files.
pub struct CacheLifecycleManager {
    cache_dir: PathBuf,
    active: Mutex<Option<Arc<SqliteTranslationStore>>>,
}

impl CacheLifecycleManager {
    pub fn new(cache_dir: PathBuf) -> Self {
        CacheLifecycleManager {
            cache_dir,
            active: Mutex::new(None),
        }
    }

    /// Fixed per-user cache directory for the application.
    pub fn default_cache_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "doctrans")
            .context("Could not determine the user cache directory")?;
        Ok(dirs.cache_dir().to_path_buf())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create and open a fresh, uniquely named database in the cache
    /// directory, optionally purging all previously created ones first.
    /// The opened store is retained as the active handle.
    pub fn create_new(
        &self,
        purge_existing: bool,
    ) -> Result<(PathBuf, Arc<SqliteTranslationStore>)> {
        fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!("Failed to create cache directory {:?}", self.cache_dir)
        })?;

        if purge_existing {
            self.purge_all()?;
        }

        let db_path = self.cache_dir.join(generate_db_name());
        let store = Arc::new(SqliteTranslationStore::open(&db_path)?);
        *self.active.lock().unwrap() = Some(Arc::clone(&store));
        info!("Opened translation cache database {:?}", db_path);
        Ok((db_path, store))
    }

    /// Drop the active store handle if any. Safe to call when already closed.
    pub fn close_active(&self) {
        if self.active.lock().unwrap().take().is_some() {
            info!("Closed active translation cache database");
        }
    }

    /// Close any open connection, then remove every database file matching
    /// the naming pattern together with its side-files. Returns the number
    /// of databases removed. Files not matching the pattern are left alone.
    pub fn purge_all(&self) -> Result<usize> {
        self.close_active();

        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read cache directory {:?}", self.cache_dir)
                })
            }
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if is_cache_db_name(name) && remove_db_files(&entry.path()) {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(
                "Purged {} stale cache database(s) from {:?}",
                removed, self.cache_dir
            );
        }
        Ok(removed)
    }

    /// Create an isolated, temporary store outside the shared naming
    /// pattern. Test fixtures only, never production data.
    pub fn create_ephemeral() -> Result<(PathBuf, Arc<SqliteTranslationStore>)> {
        let db_path = std::env::temp_dir().join(format!(
            "translation-cache.{:08x}{}",
            rand::random::<u32>(),
            CACHE_DB_SUFFIX
        ));
        let store = Arc::new(SqliteTranslationStore::open(&db_path)?);
        Ok((db_path, store))
    }

    /// Drop all data of an ephemeral store and remove its files.
    pub fn destroy_ephemeral(db_path: &Path) -> Result<()> {
        remove_db_files(db_path);
        Ok(())
    }
}
