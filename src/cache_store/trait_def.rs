use super::models::{CacheEntry, CacheKey, SourceEntry};
use anyhow::Result;

/// Trait for translation cache storage operations.
///
/// Implementations must be safe for concurrent `lookup`/`upsert` calls from
/// multiple worker threads; no additional application-level lock is expected
/// around them.
pub trait TranslationStore: Send + Sync {
    /// Insert a translation, or replace the existing one for the same key.
    ///
    /// The row id is preserved across replacements so that bulk-correction
    /// ids stay stable.
    fn upsert(&self, key: &CacheKey, translation: &str) -> Result<()>;

    /// Look up a translation. `None` is a cache miss, never an error.
    fn lookup(&self, key: &CacheKey) -> Result<Option<String>>;

    /// All (id, source_text) pairs ordered by id, for bulk export.
    fn export_entries(&self) -> Result<Vec<SourceEntry>>;

    /// Overwrite the translation of the entry with the given id.
    /// Returns false when no entry with that id exists.
    fn apply_correction(&self, id: i64, translation: &str) -> Result<bool>;

    /// Number of entries currently stored.
    fn entry_count(&self) -> Result<usize>;

    /// All rows ordered by id, for maintenance tooling.
    fn dump_entries(&self) -> Result<Vec<CacheEntry>>;
}
