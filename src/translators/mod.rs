//! Contract between the coordination core and per-format document
//! translators, which live outside this crate.

mod registry;

pub use registry::{TranslatorFactory, TranslatorRegistry, TranslatorVariant};

use crate::cache::TranslationCache;
use crate::coordinator::{StopRequested, StopSignal};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Progress sink supplied by the embedding layer; value in `0.0..=1.0`.
pub type ProgressFn = dyn Fn(f32, Option<&str>) + Send + Sync;

/// The narrow surface a translator gets to work with: cache lookup/storage,
/// the cooperative stop signal, and progress reporting.
pub struct TranslationContext<'a> {
    cache: &'a TranslationCache,
    stop: &'a StopSignal,
    progress: &'a ProgressFn,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        cache: &'a TranslationCache,
        stop: &'a StopSignal,
        progress: &'a ProgressFn,
    ) -> Self {
        TranslationContext {
            cache,
            stop,
            progress,
        }
    }

    /// Consult the cache before any remote call.
    pub fn cached_translation(&self, source_text: &str) -> Result<Option<String>> {
        self.cache.get(source_text)
    }

    /// Store a freshly produced translation.
    pub fn store_translation(&self, source_text: &str, translation: &str) -> Result<()> {
        self.cache.set(source_text, translation)
    }

    /// Cancellation checkpoint. Translators must call this at each unit of
    /// work and propagate the error unchanged.
    pub fn check_stop(&self) -> Result<(), StopRequested> {
        self.stop.check()
    }

    /// Report progress. The progress path doubles as a cancellation
    /// checkpoint, so latency is bounded by one unit of work even for
    /// translators that only report progress.
    pub fn report_progress(&self, value: f32, desc: Option<&str>) -> Result<(), StopRequested> {
        self.stop.check()?;
        (self.progress)(value, desc);
        Ok(())
    }
}

/// One per-format translator. Implementations may spawn up to the job's
/// `thread_count` worker threads internally; those workers are the only
/// concurrent callers of the cache during normal operation.
pub trait DocumentTranslator: Send + Sync {
    /// Translate `input` and write the result under `output_dir`, returning
    /// the path of the produced file.
    fn translate(
        &self,
        input: &Path,
        output_dir: &Path,
        ctx: &TranslationContext,
    ) -> Result<PathBuf>;
}
