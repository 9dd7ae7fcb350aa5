use super::models::{JobOutcome, SubmitOutcome, TranslationJob};
use super::stop::{StopRequested, StopSignal};
use anyhow::Result;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{error, info};

/// Executes one job to completion on the calling thread. Implementations
/// must treat the stop signal as a cooperative cancellation request and
/// return `StopRequested` (via anyhow) when they honor it.
pub trait JobRunner: Send + Sync {
    fn run(&self, job: &TranslationJob, stop: &StopSignal) -> Result<()>;
}

struct PendingJob {
    job: TranslationJob,
    outcome_tx: mpsc::Sender<JobOutcome>,
}

#[derive(Default)]
struct QueueState {
    active_count: usize,
    backlog: VecDeque<PendingJob>,
}

/// Single-flight job execution with a FIFO backlog.
///
/// At most one job runs at any time; submissions that arrive while a job is
/// active are queued and launched in arrival order as slots free up. All
/// admission decisions happen under one lock so two concurrent submissions
/// can never both observe an idle coordinator.
pub struct JobCoordinator {
    state: Mutex<QueueState>,
    stop: StopSignal,
    runner: Arc<dyn JobRunner>,
}

impl JobCoordinator {
    pub fn new(runner: Arc<dyn JobRunner>) -> Arc<Self> {
        Arc::new(JobCoordinator {
            state: Mutex::new(QueueState::default()),
            stop: StopSignal::new(),
            runner,
        })
    }

    /// The shared stop signal. Requesting a stop through it cancels the
    /// currently running job; queued jobs are unaffected because the flag
    /// is reset when each job starts.
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Admit a job: start it immediately if no job is active, otherwise
    /// append it to the backlog. The returned receiver yields the job's
    /// terminal outcome exactly once.
    pub fn submit(
        self: &Arc<Self>,
        job: TranslationJob,
    ) -> (SubmitOutcome, mpsc::Receiver<JobOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let decision = {
            let mut state = self.state.lock().unwrap();
            if state.active_count == 0 {
                state.active_count = 1;
                SubmitOutcome::Started
            } else {
                state.backlog.push_back(PendingJob {
                    job: job.clone(),
                    outcome_tx: outcome_tx.clone(),
                });
                SubmitOutcome::Queued {
                    position: state.backlog.len(),
                }
            }
        };

        match decision {
            SubmitOutcome::Started => {
                info!("Starting translation job with {} file(s)", job.files.len());
                self.launch(job, outcome_tx);
            }
            SubmitOutcome::Queued { position } => {
                info!("Queued translation job at backlog position {}", position);
            }
        }

        (decision, outcome_rx)
    }

    fn launch(self: &Arc<Self>, job: TranslationJob, outcome_tx: mpsc::Sender<JobOutcome>) {
        let coordinator = self.clone();
        thread::spawn(move || coordinator.execute(job, outcome_tx));
    }

    fn execute(self: Arc<Self>, job: TranslationJob, outcome_tx: mpsc::Sender<JobOutcome>) {
        // A stale stop request must never leak into a new job.
        self.stop.reset();

        let runner = self.runner.clone();
        let stop = self.stop.clone();
        let run_result = catch_unwind(AssertUnwindSafe(|| runner.run(&job, &stop)));

        let outcome = match run_result {
            Ok(Ok(())) => {
                info!("Translation job completed");
                JobOutcome::Completed
            }
            Ok(Err(err)) => {
                if err.downcast_ref::<StopRequested>().is_some() {
                    info!("Translation job stopped by user");
                    JobOutcome::Stopped
                } else {
                    error!("Translation job failed: {:#}", err);
                    JobOutcome::Failed(format!("{:#}", err))
                }
            }
            Err(_) => {
                error!("Translation job panicked");
                JobOutcome::Failed("translation job panicked".to_string())
            }
        };

        // Receiver may have been dropped by a caller that doesn't wait.
        let _ = outcome_tx.send(outcome);

        self.on_job_finished();
    }

    fn on_job_finished(self: &Arc<Self>) {
        let next = {
            let mut state = self.state.lock().unwrap();
            match state.backlog.pop_front() {
                Some(pending) => {
                    state.active_count = 1;
                    Some(pending)
                }
                None => {
                    state.active_count = 0;
                    None
                }
            }
        };

        if let Some(pending) = next {
            info!(
                "Starting queued translation job with {} file(s)",
                pending.job.files.len()
            );
            self.launch(pending.job, pending.outcome_tx);
        }
    }

    #[cfg(test)]
    fn active_count(&self) -> usize {
        self.state.lock().unwrap().active_count
    }

    #[cfg(test)]
    fn backlog_len(&self) -> usize {
        self.state.lock().unwrap().backlog.len()
    }
}
