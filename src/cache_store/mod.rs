//! Durable storage for translated text segments.
//!
//! Provides SQLite-backed, crash-safe key/value storage keyed on
//! (engine, canonical params, source text), with atomic upsert semantics.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{CacheEntry, CacheKey, SourceEntry};
pub use store::SqliteTranslationStore;
pub use trait_def::TranslationStore;
