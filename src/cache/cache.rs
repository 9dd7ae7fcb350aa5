use super::key::canonicalize_params;
use crate::cache_store::{CacheKey, TranslationStore};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Hard upper bound on the engine name length, in characters. Violating it
/// is a contract error on construction, never a runtime cache miss.
pub const MAX_ENGINE_NAME_LEN: usize = 20;

/// Record emitted by the bulk export, one per cache entry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRecord {
    pub count_src: i64,
    pub value: String,
}

/// Record consumed by the bulk import.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportRecord {
    pub count_src: i64,
    pub translated: String,
}

/// Outcome of a bulk correction import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionImportStats {
    pub applied: usize,
    pub skipped: usize,
}

/// Deduplicating lookup/storage of text -> translation pairs, keyed on
/// engine identity + canonical parameters + source text.
///
/// Parameters may be finalized incrementally via `replace_params`,
/// `update_params` and `add_param`; once multi-threaded lookups begin for a
/// given engine + params combination that combination is treated as fixed
/// for the run, so the mutating methods take `&mut self` while `get`/`set`
/// are `&self` and safe to call from concurrent worker threads.
pub struct TranslationCache {
    engine: String,
    params: Map<String, Value>,
    canonical_params: String,
    store: Arc<dyn TranslationStore>,
}

impl TranslationCache {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        engine: impl Into<String>,
        params: Option<Map<String, Value>>,
    ) -> Result<Self> {
        let engine = engine.into();
        if engine.chars().count() > MAX_ENGINE_NAME_LEN {
            bail!(
                "translation engine name {:?} exceeds {} characters",
                engine,
                MAX_ENGINE_NAME_LEN
            );
        }
        let params = params.unwrap_or_default();
        let canonical_params = canonicalize_params(&params);
        Ok(TranslationCache {
            engine,
            params,
            canonical_params,
            store,
        })
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn canonical_params(&self) -> &str {
        &self.canonical_params
    }

    /// Replace the active parameter set and recompute the canonical form.
    pub fn replace_params(&mut self, params: Option<Map<String, Value>>) {
        self.params = params.unwrap_or_default();
        self.canonical_params = canonicalize_params(&self.params);
    }

    /// Merge into the existing parameter set and recompute the canonical form.
    pub fn update_params(&mut self, params: Option<Map<String, Value>>) {
        for (k, v) in params.unwrap_or_default() {
            self.params.insert(k, v);
        }
        self.canonical_params = canonicalize_params(&self.params);
    }

    /// Set a single parameter and recompute the canonical form.
    pub fn add_param(&mut self, key: impl Into<String>, value: Value) {
        self.params.insert(key.into(), value);
        self.canonical_params = canonicalize_params(&self.params);
    }

    fn cache_key<'a>(&'a self, source_text: &'a str) -> CacheKey<'a> {
        CacheKey {
            engine: &self.engine,
            engine_params: &self.canonical_params,
            source_text,
        }
    }

    /// Pure read; `None` is a miss. Safe for concurrent callers.
    pub fn get(&self, source_text: &str) -> Result<Option<String>> {
        self.store.lookup(&self.cache_key(source_text))
    }

    /// Upsert by cache key; concurrent writers for the same key converge on
    /// the last write observed by the store.
    pub fn set(&self, source_text: &str, translation: &str) -> Result<()> {
        self.store.upsert(&self.cache_key(source_text), translation)
    }

    /// Serialize all entries ordered by id for offline bulk review.
    pub fn export_to_json<P: AsRef<Path>>(&self, output_path: P) -> Result<usize> {
        export_entries_to_json(self.store.as_ref(), output_path)
    }

    /// Read corrected translations back and overwrite the matching entries.
    pub fn import_corrections<P: AsRef<Path>>(
        &self,
        input_path: P,
    ) -> Result<CorrectionImportStats> {
        import_corrections_from_json(self.store.as_ref(), input_path)
    }
}

/// Store-level bulk export, also used by the maintenance CLI.
pub fn export_entries_to_json<P: AsRef<Path>>(
    store: &dyn TranslationStore,
    output_path: P,
) -> Result<usize> {
    let records: Vec<ExportRecord> = store
        .export_entries()?
        .into_iter()
        .map(|entry| ExportRecord {
            count_src: entry.id,
            value: entry.source_text,
        })
        .collect();

    let file = File::create(output_path.as_ref()).with_context(|| {
        format!("Failed to create export file {:?}", output_path.as_ref())
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &records)?;
    info!(
        "Exported {} cache entries to {:?}",
        records.len(),
        output_path.as_ref()
    );
    Ok(records.len())
}

/// Store-level bulk import. Records whose id is not present in the store are
/// skipped; the returned stats carry the exact skip count so callers can
/// surface the discrepancy.
pub fn import_corrections_from_json<P: AsRef<Path>>(
    store: &dyn TranslationStore,
    input_path: P,
) -> Result<CorrectionImportStats> {
    let file = File::open(input_path.as_ref())
        .with_context(|| format!("Failed to open corrections file {:?}", input_path.as_ref()))?;
    let records: Vec<ImportRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse corrections file {:?}", input_path.as_ref()))?;

    let mut stats = CorrectionImportStats::default();
    for record in &records {
        if store.apply_correction(record.count_src, &record.translated)? {
            stats.applied += 1;
        } else {
            stats.skipped += 1;
        }
    }

    if stats.skipped > 0 {
        warn!(
            "Corrections import skipped {} of {} records with unknown ids",
            stats.skipped,
            records.len()
        );
    }
    info!(
        "Applied {} corrections from {:?}",
        stats.applied,
        input_path.as_ref()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache_store::SqliteTranslationStore;
    use serde_json::json;
    use tempfile::tempdir;

    fn test_cache() -> TranslationCache {
        let store = Arc::new(SqliteTranslationStore::in_memory().unwrap());
        TranslationCache::new(store, "deepseek", None).unwrap()
    }

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_engine_name_too_long_is_rejected() {
        let store: Arc<dyn TranslationStore> =
            Arc::new(SqliteTranslationStore::in_memory().unwrap());
        let result = TranslationCache::new(store, "an-engine-name-well-over-twenty", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_name_at_bound_is_accepted() {
        let store: Arc<dyn TranslationStore> =
            Arc::new(SqliteTranslationStore::in_memory().unwrap());
        let name = "x".repeat(MAX_ENGINE_NAME_LEN);
        assert!(TranslationCache::new(store, name, None).is_ok());
    }

    #[test]
    fn test_engine_name_bound_counts_characters_not_bytes() {
        let store: Arc<dyn TranslationStore> =
            Arc::new(SqliteTranslationStore::in_memory().unwrap());
        // 20 characters but 60 UTF-8 bytes; must still be accepted.
        let name = "译".repeat(MAX_ENGINE_NAME_LEN);
        assert!(TranslationCache::new(store.clone(), name, None).is_ok());

        let too_long = "译".repeat(MAX_ENGINE_NAME_LEN + 1);
        assert!(TranslationCache::new(store, too_long, None).is_err());
    }

    #[test]
    fn test_get_miss_then_set_then_hit() {
        let cache = test_cache();
        assert_eq!(cache.get("hello").unwrap(), None);
        cache.set("hello", "bonjour").unwrap();
        assert_eq!(cache.get("hello").unwrap().as_deref(), Some("bonjour"));
    }

    #[test]
    fn test_set_is_upsert() {
        let cache = test_cache();
        cache.set("hello", "bonjour").unwrap();
        cache.set("hello", "salut").unwrap();
        assert_eq!(cache.get("hello").unwrap().as_deref(), Some("salut"));
    }

    #[test]
    fn test_param_order_gives_same_key() {
        let store = Arc::new(SqliteTranslationStore::in_memory().unwrap());
        let writer = TranslationCache::new(
            store.clone() as Arc<dyn TranslationStore>,
            "deepseek",
            Some(as_map(json!({"from": "en", "to": "fr"}))),
        )
        .unwrap();
        writer.set("hello", "bonjour").unwrap();

        let reader = TranslationCache::new(
            store as Arc<dyn TranslationStore>,
            "deepseek",
            Some(as_map(json!({"to": "fr", "from": "en"}))),
        )
        .unwrap();
        assert_eq!(reader.get("hello").unwrap().as_deref(), Some("bonjour"));
    }

    #[test]
    fn test_changing_params_changes_key() {
        let mut cache = test_cache();
        cache.add_param("to", json!("fr"));
        cache.set("cat", "chat").unwrap();

        cache.add_param("to", json!("it"));
        assert_eq!(cache.get("cat").unwrap(), None);

        cache.add_param("to", json!("fr"));
        assert_eq!(cache.get("cat").unwrap().as_deref(), Some("chat"));
    }

    #[test]
    fn test_update_params_merges() {
        let mut cache = test_cache();
        cache.replace_params(Some(as_map(json!({"from": "en"}))));
        cache.update_params(Some(as_map(json!({"to": "fr"}))));
        assert_eq!(cache.canonical_params(), r#"{"from":"en","to":"fr"}"#);

        cache.replace_params(Some(as_map(json!({"to": "fr"}))));
        assert_eq!(cache.canonical_params(), r#"{"to":"fr"}"#);
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("review.json");

        let cache = test_cache();
        cache.set("one", "uno").unwrap();
        cache.set("two", "due").unwrap();
        cache.set("three", "tre").unwrap();

        let exported = cache.export_to_json(&json_path).unwrap();
        assert_eq!(exported, 3);

        let records: Vec<ExportRecord> =
            serde_json::from_reader(File::open(&json_path).unwrap()).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].count_src < w[1].count_src));

        // Correct one entry, re-import the rest unchanged.
        let corrections: Vec<ImportRecord> = records
            .iter()
            .map(|r| ImportRecord {
                count_src: r.count_src,
                translated: if r.value == "two" {
                    "TWO-corrected".to_string()
                } else {
                    format!("same-{}", r.value)
                },
            })
            .collect();
        let corrections_path = dir.path().join("corrections.json");
        serde_json::to_writer(File::create(&corrections_path).unwrap(), &corrections).unwrap();

        let stats = cache.import_corrections(&corrections_path).unwrap();
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.skipped, 0);
        assert_eq!(cache.get("two").unwrap().as_deref(), Some("TWO-corrected"));
        assert_eq!(cache.get("one").unwrap().as_deref(), Some("same-one"));
    }

    #[test]
    fn test_import_counts_unknown_ids() {
        let dir = tempdir().unwrap();
        let cache = test_cache();
        cache.set("hello", "bonjour").unwrap();

        let corrections = vec![
            ImportRecord {
                count_src: 1,
                translated: "salut".to_string(),
            },
            ImportRecord {
                count_src: 4242,
                translated: "never applied".to_string(),
            },
        ];
        let path = dir.path().join("corrections.json");
        serde_json::to_writer(File::create(&path).unwrap(), &corrections).unwrap();

        let stats = cache.import_corrections(&path).unwrap();
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(cache.get("hello").unwrap().as_deref(), Some("salut"));
    }
}
