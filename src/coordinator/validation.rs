use super::models::TranslationJob;
use crate::translators::TranslatorRegistry;
use thiserror::Error;

/// Synchronous rejections reported to the user before a job ever reaches
/// the coordinator or the cache layer. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobValidationError {
    #[error("no files selected for translation")]
    NoFiles,
    #[error("an API credential is required for online models")]
    MissingApiKey,
    #[error("unsupported file type {0:?}")]
    UnsupportedExtension(String),
}

pub fn validate_job(
    job: &TranslationJob,
    registry: &TranslatorRegistry,
) -> Result<(), JobValidationError> {
    if job.files.is_empty() {
        return Err(JobValidationError::NoFiles);
    }
    if job.use_online && job.api_key.as_deref().unwrap_or("").is_empty() {
        return Err(JobValidationError::MissingApiKey);
    }
    for file in &job.files {
        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        if !registry.supports(&extension, &job.modes) {
            return Err(JobValidationError::UnsupportedExtension(extension));
        }
    }
    Ok(())
}
