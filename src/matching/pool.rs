//! Thread-safe collection of complete rosters.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::state::SearchState;

/// Append-only solution store shared by all workers.
#[derive(Debug, Default)]
pub struct SolutionPool {
    solutions: Mutex<Vec<SearchState>>,
    count: AtomicUsize, // Avoid locking for loop conditions
}

impl SolutionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a solution and returns its 1-based ordinal.
    pub fn push(&self, solution: SearchState) -> usize {
        let mut guard = self.solutions.lock();
        guard.push(solution);
        let ordinal = guard.len();
        self.count.store(ordinal, Ordering::Release);
        ordinal
    }

    /// Number of collected solutions.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Whether no solution was collected yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest-scoring solution. Ties go to the earliest collected.
    pub fn into_best(self) -> Option<SearchState> {
        let mut best: Option<(i32, SearchState)> = None;
        for solution in self.solutions.into_inner() {
            let score = solution.score();
            let better = match &best {
                Some((top, _)) => score > *top,
                None => true,
            };
            if better {
                best = Some((score, solution));
            }
        }
        best.map(|(_, solution)| solution)
    }
}
