use super::coordinator::JobRunner;
use super::models::TranslationJob;
use super::stop::StopSignal;
use crate::cache::TranslationCache;
use crate::cache_store::TranslationStore;
use crate::translators::{ProgressFn, TranslationContext, TranslatorRegistry};
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Production [`JobRunner`]: resolves a translator per input file, shares
/// one cache across the whole job, and reports file-granular progress.
pub struct DocumentJobRunner {
    registry: Arc<TranslatorRegistry>,
    store: Arc<dyn TranslationStore>,
    result_dir: PathBuf,
    progress: Arc<ProgressFn>,
}

impl DocumentJobRunner {
    pub fn new(
        registry: Arc<TranslatorRegistry>,
        store: Arc<dyn TranslationStore>,
        result_dir: PathBuf,
        progress: Arc<ProgressFn>,
    ) -> Self {
        DocumentJobRunner {
            registry,
            store,
            result_dir,
            progress,
        }
    }

    /// Engine parameters that must segregate cache entries: translations
    /// produced for a different language pair or glossary are never valid
    /// hits for this job.
    fn cache_params(job: &TranslationJob) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("src_lang".to_string(), json!(job.src_lang));
        params.insert("dst_lang".to_string(), json!(job.dst_lang));
        if let Some(glossary) = &job.glossary {
            params.insert("glossary".to_string(), json!(glossary));
        }
        params
    }
}

impl JobRunner for DocumentJobRunner {
    fn run(&self, job: &TranslationJob, stop: &StopSignal) -> Result<()> {
        let cache = TranslationCache::new(
            self.store.clone(),
            &job.model,
            Some(Self::cache_params(job)),
        )?;

        std::fs::create_dir_all(&self.result_dir)
            .with_context(|| format!("Failed to create result dir {:?}", self.result_dir))?;

        let total = job.files.len();
        for (index, file) in job.files.iter().enumerate() {
            stop.check()?;

            let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");
            let factory = self
                .registry
                .resolve(extension, &job.modes)
                .ok_or_else(|| anyhow!("no translator registered for {:?}", file))?;
            let translator = factory(job);

            let base = index as f32 / total as f32;
            let span = 1.0 / total as f32;
            let outer_progress = self.progress.clone();
            let file_progress = move |value: f32, desc: Option<&str>| {
                outer_progress(base + value * span, desc);
            };

            let ctx = TranslationContext::new(&cache, stop, &file_progress);
            let produced = translator
                .translate(file, &self.result_dir, &ctx)
                .with_context(|| format!("Failed to translate {file:?}"))?;
            info!("Translated {:?} -> {:?}", file, produced);
        }

        (self.progress)(1.0, None);
        Ok(())
    }
}
