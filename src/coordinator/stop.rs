use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

/// Raised by a cancellation checkpoint when a stop has been requested.
/// Distinguishable from ordinary failures so callers can report
/// "stopped by user" rather than "error".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("translation stopped by user")]
pub struct StopRequested;

/// Cooperative cancellation flag for the currently running job.
///
/// Guarded by its own mutex, independent of the coordinator's queue lock.
/// Clones share the same flag.
#[derive(Clone, Default)]
pub struct StopSignal {
    flag: Arc<Mutex<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the flag. Called once at the start of each job's execution,
    /// including backlog jobs when they are dequeued and launched.
    pub fn reset(&self) {
        *self.flag.lock().unwrap() = false;
    }

    /// Request cancellation of the currently running job. Idempotent.
    ///
    /// Only the running job observes the request: a job still waiting in
    /// the backlog resets the flag when it starts, absorbing any stop
    /// request issued while it was queued.
    pub fn request_stop(&self) {
        let mut flag = self.flag.lock().unwrap();
        if !*flag {
            *flag = true;
            info!("Stop requested for the running translation job");
        }
    }

    /// Cancellation checkpoint.
    pub fn check(&self) -> Result<(), StopRequested> {
        if *self.flag.lock().unwrap() {
            Err(StopRequested)
        } else {
            Ok(())
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.flag.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_passes_until_stop_requested() {
        let signal = StopSignal::new();
        assert!(signal.check().is_ok());

        signal.request_stop();
        assert_eq!(signal.check(), Err(StopRequested));
        assert!(signal.is_stop_requested());
    }

    #[test]
    fn test_request_stop_is_idempotent() {
        let signal = StopSignal::new();
        signal.request_stop();
        signal.request_stop();
        assert_eq!(signal.check(), Err(StopRequested));
    }

    #[test]
    fn test_reset_clears_the_flag() {
        let signal = StopSignal::new();
        signal.request_stop();
        signal.reset();
        assert!(signal.check().is_ok());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let signal = StopSignal::new();
        let clone = signal.clone();
        clone.request_stop();
        assert_eq!(signal.check(), Err(StopRequested));
    }
}
