//! Explicit registry mapping file extensions and mode flags to translator
//! factories, populated at startup by the embedding layer.

use super::DocumentTranslator;
use crate::coordinator::{ModeFlags, TranslationJob};
use std::collections::HashMap;
use std::sync::Arc;

/// Which rendition of a format's translator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslatorVariant {
    Standard,
    /// Alternate layout handling (spreadsheets only).
    AltLayout,
    /// Side-by-side source and translation output.
    Bilingual,
}

pub type TranslatorFactory = Arc<dyn Fn(&TranslationJob) -> Box<dyn DocumentTranslator> + Send + Sync>;

#[derive(Default)]
pub struct TranslatorRegistry {
    factories: HashMap<(String, TranslatorVariant), TranslatorFactory>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for an extension (without the leading dot) and
    /// variant. Later registrations replace earlier ones.
    pub fn register<F>(&mut self, extension: &str, variant: TranslatorVariant, factory: F)
    where
        F: Fn(&TranslationJob) -> Box<dyn DocumentTranslator> + Send + Sync + 'static,
    {
        self.factories
            .insert((normalize(extension), variant), Arc::new(factory));
    }

    /// Which variant a job's mode flags select for the given extension.
    pub fn variant_for(extension: &str, modes: &ModeFlags) -> TranslatorVariant {
        match normalize(extension).as_str() {
            "xlsx" if modes.spreadsheet_bilingual => TranslatorVariant::Bilingual,
            "xlsx" if modes.spreadsheet_alt_layout => TranslatorVariant::AltLayout,
            "docx" if modes.word_bilingual => TranslatorVariant::Bilingual,
            _ => TranslatorVariant::Standard,
        }
    }

    /// Resolve the factory for an extension under the given mode flags.
    /// A mode-specific variant that was never registered falls back to the
    /// standard one.
    pub fn resolve(&self, extension: &str, modes: &ModeFlags) -> Option<&TranslatorFactory> {
        let ext = normalize(extension);
        let variant = Self::variant_for(&ext, modes);
        self.factories
            .get(&(ext.clone(), variant))
            .or_else(|| self.factories.get(&(ext, TranslatorVariant::Standard)))
    }

    pub fn supports(&self, extension: &str, modes: &ModeFlags) -> bool {
        self.resolve(extension, modes).is_some()
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translators::TranslationContext;
    use anyhow::Result;
    use std::path::{Path, PathBuf};

    struct NamedTranslator(&'static str);

    impl DocumentTranslator for NamedTranslator {
        fn translate(
            &self,
            _input: &Path,
            output_dir: &Path,
            _ctx: &TranslationContext,
        ) -> Result<PathBuf> {
            Ok(output_dir.join(self.0))
        }
    }

    fn registry_with(entries: &[(&str, TranslatorVariant, &'static str)]) -> TranslatorRegistry {
        let mut registry = TranslatorRegistry::new();
        for (ext, variant, name) in entries {
            let name = *name;
            registry.register(ext, *variant, move |_job| Box::new(NamedTranslator(name)));
        }
        registry
    }

    fn resolved_name(registry: &TranslatorRegistry, ext: &str, modes: &ModeFlags) -> &'static str {
        let factory = registry.resolve(ext, modes).expect("factory");
        let job = TranslationJob::new(vec![], "m", "en", "fr");
        let translator = factory(&job);
        let ctx_cache = crate::cache::TranslationCache::new(
            std::sync::Arc::new(crate::cache_store::SqliteTranslationStore::in_memory().unwrap()),
            "e",
            None,
        )
        .unwrap();
        let stop = crate::coordinator::StopSignal::new();
        let progress = |_: f32, _: Option<&str>| {};
        let ctx = TranslationContext::new(&ctx_cache, &stop, &progress);
        let path = translator
            .translate(Path::new("in"), Path::new("out"), &ctx)
            .unwrap();
        match path.file_name().unwrap().to_str().unwrap() {
            "standard" => "standard",
            "alt" => "alt",
            "bilingual" => "bilingual",
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_resolve_by_extension_case_insensitive() {
        let registry = registry_with(&[("xlsx", TranslatorVariant::Standard, "standard")]);
        let modes = ModeFlags::default();
        assert!(registry.supports("xlsx", &modes));
        assert!(registry.supports(".XLSX", &modes));
        assert!(!registry.supports("pdf", &modes));
    }

    #[test]
    fn test_mode_flags_select_variant() {
        let registry = registry_with(&[
            ("xlsx", TranslatorVariant::Standard, "standard"),
            ("xlsx", TranslatorVariant::AltLayout, "alt"),
            ("xlsx", TranslatorVariant::Bilingual, "bilingual"),
        ]);

        let standard = ModeFlags::default();
        assert_eq!(resolved_name(&registry, "xlsx", &standard), "standard");

        let alt = ModeFlags {
            spreadsheet_alt_layout: true,
            ..Default::default()
        };
        assert_eq!(resolved_name(&registry, "xlsx", &alt), "alt");

        // Bilingual wins over alternate layout when both are set.
        let bilingual = ModeFlags {
            spreadsheet_alt_layout: true,
            spreadsheet_bilingual: true,
            ..Default::default()
        };
        assert_eq!(resolved_name(&registry, "xlsx", &bilingual), "bilingual");
    }

    #[test]
    fn test_unregistered_variant_falls_back_to_standard() {
        let registry = registry_with(&[("docx", TranslatorVariant::Standard, "standard")]);
        let modes = ModeFlags {
            word_bilingual: true,
            ..Default::default()
        };
        assert_eq!(resolved_name(&registry, "docx", &modes), "standard");
    }
}
