//! Job concurrency coordination: single-flight execution with a FIFO
//! backlog, cooperative cancellation, and upstream validation.

#[allow(clippy::module_inception)]
mod coordinator;
mod models;
mod runner;
mod stop;
mod validation;

pub use coordinator::{JobCoordinator, JobRunner};
pub use models::{JobOutcome, ModeFlags, SubmitOutcome, TranslationJob};
pub use runner::DocumentJobRunner;
pub use stop::{StopRequested, StopSignal};
pub use validation::{validate_job, JobValidationError};
