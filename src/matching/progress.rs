//! Progress notifications from running workers.

use std::fmt;

/// A solution was collected by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionFound {
    /// Worker that found it.
    pub worker: usize,
    /// 1-based position in the shared pool.
    pub ordinal: usize,
    /// Score after refinement.
    pub score: i32,
    /// Search calls used by the successful trial.
    pub calls: usize,
    /// Scarcity threshold of the trial.
    pub threshold: usize,
}

impl fmt::Display for SolutionFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}: Score={} R={} Th={}",
            self.ordinal, self.score, self.calls, self.threshold
        )
    }
}

/// Receives progress from every worker, possibly concurrently.
pub trait ProgressListener: Send + Sync {
    /// Called once per solution added to the pool.
    fn on_solution(&self, event: &SolutionFound);
}

impl<F> ProgressListener for F
where
    F: Fn(&SolutionFound) + Send + Sync,
{
    fn on_solution(&self, event: &SolutionFound) {
        self(event)
    }
}
