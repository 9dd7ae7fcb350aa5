//! Document Translation Job Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod cache;
pub mod cache_store;
pub mod config;
pub mod coordinator;
pub mod sqlite_persistence;
pub mod translators;

// Re-export commonly used types for convenience
pub use cache::{CacheLifecycleManager, TranslationCache};
pub use cache_store::{SqliteTranslationStore, TranslationStore};
pub use coordinator::{JobCoordinator, JobOutcome, StopSignal, SubmitOutcome, TranslationJob};
pub use translators::{DocumentTranslator, TranslatorRegistry};
