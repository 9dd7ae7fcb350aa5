mod file_config;

pub use file_config::{FileConfig, ModesConfig};

use crate::coordinator::{ModeFlags, TranslationJob};
use anyhow::Result;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub cache_dir: Option<PathBuf>,
    pub result_dir: Option<PathBuf>,
    pub default_online: bool,
    pub default_src_lang: String,
    pub default_dst_lang: String,
    pub max_token: u32,
    pub max_retries: u32,
    pub thread_count_online: usize,
    pub thread_count_offline: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            result_dir: None,
            default_online: false,
            default_src_lang: "auto".to_string(),
            default_dst_lang: "en".to_string(),
            max_token: 768,
            max_retries: 4,
            thread_count_online: 4,
            thread_count_offline: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cache_dir: Option<PathBuf>,
    pub result_dir: PathBuf,
    pub default_online: bool,
    pub default_src_lang: String,
    pub default_dst_lang: String,
    pub default_glossary: Option<String>,
    pub max_token: u32,
    pub max_retries: u32,
    pub thread_count_online: usize,
    pub thread_count_offline: usize,
    pub default_modes: ModeFlags,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let cache_dir = file.cache_dir.map(PathBuf::from).or_else(|| cli.cache_dir.clone());
        let result_dir = file
            .result_dir
            .map(PathBuf::from)
            .or_else(|| cli.result_dir.clone())
            .unwrap_or_else(|| PathBuf::from("result"));

        let default_online = file.default_online.unwrap_or(cli.default_online);
        let default_src_lang = file
            .default_src_lang
            .unwrap_or_else(|| cli.default_src_lang.clone());
        let default_dst_lang = file
            .default_dst_lang
            .unwrap_or_else(|| cli.default_dst_lang.clone());
        let default_glossary = file.default_glossary;

        let max_token = file.max_token.unwrap_or(cli.max_token);
        let max_retries = file.max_retries.unwrap_or(cli.max_retries);
        let thread_count_online = file.thread_count_online.unwrap_or(cli.thread_count_online);
        let thread_count_offline = file.thread_count_offline.unwrap_or(cli.thread_count_offline);

        let modes_file = file.modes.unwrap_or_default();
        let default_modes = ModeFlags {
            spreadsheet_alt_layout: modes_file.spreadsheet_alt_layout.unwrap_or(false),
            spreadsheet_bilingual: modes_file.spreadsheet_bilingual.unwrap_or(false),
            word_bilingual: modes_file.word_bilingual.unwrap_or(false),
        };

        Ok(Self {
            cache_dir,
            result_dir,
            default_online,
            default_src_lang,
            default_dst_lang,
            default_glossary,
            max_token,
            max_retries,
            thread_count_online,
            thread_count_offline,
            default_modes,
        })
    }

    /// Online backends tolerate more parallel requests than local ones.
    pub fn default_thread_count(&self, use_online: bool) -> usize {
        if use_online {
            self.thread_count_online
        } else {
            self.thread_count_offline
        }
    }

    /// Build a job for `files` against `model`, stamped with the configured
    /// defaults. Callers adjust language pair and modes afterwards as the
    /// user requests.
    pub fn new_job(&self, files: Vec<PathBuf>, model: impl Into<String>) -> TranslationJob {
        let mut job = TranslationJob::new(
            files,
            model,
            self.default_src_lang.clone(),
            self.default_dst_lang.clone(),
        );
        job.use_online = self.default_online;
        job.max_token = self.max_token;
        job.max_retries = self.max_retries;
        job.thread_count = self.default_thread_count(self.default_online);
        job.modes = self.default_modes;
        job.glossary = self.default_glossary.clone();
        job
    }
}
