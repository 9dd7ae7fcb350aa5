use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub cache_dir: Option<String>,
    pub result_dir: Option<String>,
    pub default_online: Option<bool>,
    pub default_src_lang: Option<String>,
    pub default_dst_lang: Option<String>,
    pub default_glossary: Option<String>,
    pub max_token: Option<u32>,
    pub max_retries: Option<u32>,
    pub thread_count_online: Option<usize>,
    pub thread_count_offline: Option<usize>,

    // Feature configs
    pub modes: Option<ModesConfig>,
}

/// Default per-format translator mode switches; a job may still override
/// them at submission time.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ModesConfig {
    pub spreadsheet_alt_layout: Option<bool>,
    pub spreadsheet_bilingual: Option<bool>,
    pub word_bilingual: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
