//! Translation cache front-end and database lifecycle management.

mod cache;
mod key;
mod lifecycle;

pub use cache::{
    export_entries_to_json, import_corrections_from_json, CorrectionImportStats,
    TranslationCache, MAX_ENGINE_NAME_LEN,
};
pub use key::canonicalize_params;
pub use lifecycle::{generate_db_name, CacheLifecycleManager, CACHE_DB_PREFIX, CACHE_DB_SUFFIX};
