//! Single-threaded backtracking search.
//!
//! # Algorithm
//! Each call on a state that is not yet complete tries, in order:
//!
//! 1. **Inflexible physicians**: anyone whose assignable slots exactly
//!    cover their remaining quota takes one of those slots.
//! 2. **Scarce slots**: the first open slot with at most `threshold`
//!    eligible physicians is filled, least-loaded physician first. If none
//!    of them works the branch fails without reaching tier 3.
//! 3. **Free choice**: physicians by descending contribution, each trying
//!    their lightest slots first.
//!
//! Every attempt assigns on a clone and recurses; a rejected assignment
//! just drops the clone. A trial fails once it has used more than
//! `recursion_max` calls.
//!
//! The driver raises `threshold` from 1 to `threshold_max`, running
//! `trial_max` fresh trials at each level until the shared pool holds
//! `solution_max` solutions.

use rand::Rng;
use tracing::{debug, info};

use super::config::SearchLimits;
use super::pool::SolutionPool;
use super::progress::{ProgressListener, SolutionFound};
use super::state::{SearchState, SortOrder};

/// One search thread's worth of state.
pub struct SearchWorker<'a, R: Rng> {
    id: usize,
    initial: &'a SearchState,
    pool: &'a SolutionPool,
    listener: Option<&'a dyn ProgressListener>,
    limits: SearchLimits,
    rng: R,
    calls: usize,
    threshold: usize,
}

impl<'a, R: Rng> SearchWorker<'a, R> {
    /// Creates a worker searching from `initial` and publishing to `pool`.
    pub fn new(
        id: usize,
        initial: &'a SearchState,
        pool: &'a SolutionPool,
        limits: SearchLimits,
        rng: R,
    ) -> Self {
        Self {
            id,
            initial,
            pool,
            listener: None,
            limits,
            rng,
            calls: 0,
            threshold: 1,
        }
    }

    /// Reports every collected solution to `listener`.
    pub fn with_listener(mut self, listener: &'a dyn ProgressListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Worker number, used in logs and progress events.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs the threshold/trial loop and returns how many solutions this
    /// worker contributed.
    pub fn run(mut self) -> usize {
        let limits = self.limits;
        debug!(worker = self.id, ?limits, "worker started");

        let mut found = 0;
        for threshold in 1..=limits.threshold_max {
            if self.pool.len() >= limits.solution_max {
                break;
            }
            self.threshold = threshold;

            for _ in 0..limits.trial_max {
                if self.pool.len() >= limits.solution_max {
                    break;
                }
                self.calls = 0;
                let Some(solution) = self.search(self.initial.clone()) else {
                    continue;
                };

                let solution = solution.refine(limits.refine_cycle);
                let score = solution.score();
                let ordinal = self.pool.push(solution);
                found += 1;

                let event = SolutionFound {
                    worker: self.id,
                    ordinal,
                    score,
                    calls: self.calls,
                    threshold,
                };
                info!(
                    worker = self.id,
                    ordinal,
                    score,
                    calls = self.calls,
                    threshold,
                    "solution collected"
                );
                if let Some(listener) = self.listener {
                    listener.on_solution(&event);
                }
            }
        }

        debug!(worker = self.id, found, "worker finished");
        found
    }

    fn search(&mut self, state: SearchState) -> Option<SearchState> {
        if state.is_fulfilled() {
            return Some(state);
        }
        if self.calls > self.limits.recursion_max {
            return None;
        }
        self.calls += 1;

        for physician in state.inflexible_physicians() {
            for slot in state.assignable_slots(physician, SortOrder::Unspecified, &mut self.rng) {
                if let Some(done) = self.descend(&state, slot, physician) {
                    return Some(done);
                }
            }
        }

        let scarce = state
            .open_slots()
            .iter()
            .copied()
            .find(|&s| state.slot(s).available_count() <= self.threshold);
        if let Some(slot) = scarce {
            for physician in state.available_physicians_for(slot, SortOrder::Ascending, &mut self.rng) {
                if let Some(done) = self.descend(&state, slot, physician) {
                    return Some(done);
                }
            }
            return None;
        }

        for physician in state.available_physicians(SortOrder::Descending, &mut self.rng) {
            for slot in state.assignable_slots(physician, SortOrder::Ascending, &mut self.rng) {
                if let Some(done) = self.descend(&state, slot, physician) {
                    return Some(done);
                }
            }
        }
        None
    }

    fn descend(&mut self, state: &SearchState, slot: usize, physician: usize) -> Option<SearchState> {
        let mut next = state.clone();
        next.assign(slot, physician, false).ok()?;
        self.search(next)
    }
}
