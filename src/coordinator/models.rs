use std::path::PathBuf;

/// Per-format translator mode switches carried by a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub spreadsheet_alt_layout: bool,
    pub spreadsheet_bilingual: bool,
    pub word_bilingual: bool,
}

/// One user-submitted translation request. Immutable once enqueued; owned
/// by the coordinator until it finishes.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub files: Vec<PathBuf>,
    pub model: String,
    pub src_lang: String,
    pub dst_lang: String,
    pub use_online: bool,
    pub api_key: Option<String>,
    pub max_retries: u32,
    pub max_token: u32,
    pub thread_count: usize,
    pub modes: ModeFlags,
    pub glossary: Option<String>,
    /// Locale used only for user-facing message formatting.
    pub session_locale: String,
}

impl TranslationJob {
    pub fn new(
        files: Vec<PathBuf>,
        model: impl Into<String>,
        src_lang: impl Into<String>,
        dst_lang: impl Into<String>,
    ) -> Self {
        TranslationJob {
            files,
            model: model.into(),
            src_lang: src_lang.into(),
            dst_lang: dst_lang.into(),
            use_online: false,
            api_key: None,
            max_retries: 4,
            max_token: 768,
            thread_count: 4,
            modes: ModeFlags::default(),
            glossary: None,
            session_locale: "en".to_string(),
        }
    }
}

/// What `submit` decided to do with a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No job was active; this one started immediately.
    Started,
    /// A job was active; queued at this 1-based backlog position.
    Queued { position: usize },
}

/// Terminal result of a job, delivered on its result channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// Cancelled cooperatively via the stop signal.
    Stopped,
    Failed(String),
}
