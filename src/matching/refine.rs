//! Local-search refinement of a complete roster.
//!
//! # Algorithm
//! Each cycle looks for one swap that strictly raises [`SearchState::score`]:
//!
//! 1. Duties the physician wanted to avoid, then neutral duties.
//! 2. For each such duty, a pairwise swap with another filled duty, then a
//!    three-way rotation.
//!
//! A partner is only asked to take a duty that weighs no more on them than
//! the one they give up. Legality is never pre-filtered: the swap is
//! replayed on a clone through `unassign`/`assign`, and any rejection just
//! drops the candidate. Pinned duties never move and never act as partners.

use tracing::debug;

use super::state::SearchState;

type Unit = (usize, usize);

impl SearchState {
    /// Applies up to `max_cycles` improving swaps and returns the result.
    ///
    /// The score never decreases. Once no improving swap exists, calling
    /// `refine` again returns an identical state.
    pub fn refine(self, max_cycles: usize) -> SearchState {
        let mut current = self;
        for cycle in 0..max_cycles {
            let Some(next) = current.improve() else {
                break;
            };
            debug!(cycle, from = current.score(), to = next.score(), "refinement swap accepted");
            current = next;
        }
        current
    }

    fn improve(&self) -> Option<SearchState> {
        let score = self.score();
        let units: Vec<Unit> = self
            .filled_units()
            .into_iter()
            .filter(|&(s, p)| !self.is_pinned(s, p))
            .collect();

        let unpreferred = units
            .iter()
            .filter(|&&(s, p)| self.is_unpreferred_duty(s, p));
        let neutral = units
            .iter()
            .filter(|&&(s, p)| !self.is_unpreferred_duty(s, p) && !self.is_preferred_duty(s, p));

        for &unit in unpreferred.chain(neutral) {
            if let Some(next) = self.try_swap(&units, unit, score) {
                return Some(next);
            }
            if let Some(next) = self.try_swap3(&units, unit, score) {
                return Some(next);
            }
        }
        None
    }

    /// `p1` on `s1` and `p2` on `s2` trade places.
    fn try_swap(&self, units: &[Unit], (s1, p1): Unit, score: i32) -> Option<SearchState> {
        for &(s2, p2) in units {
            if s2 == s1 || p2 == p1 {
                continue;
            }
            if self.slot(s1).workload(p2) > self.slot(s2).workload(p2) {
                continue;
            }

            let mut next = self.clone();
            let swapped = next.unassign(s1, p1)
                && next.unassign(s2, p2)
                && next.assign(s1, p2, false).is_ok()
                && next.assign(s2, p1, false).is_ok();
            if swapped && next.score() > score {
                return Some(next);
            }
        }
        None
    }

    /// `p2` moves to `s1`, `p3` to `s2`, `p1` to `s3`.
    fn try_swap3(&self, units: &[Unit], (s1, p1): Unit, score: i32) -> Option<SearchState> {
        for &(s2, p2) in units {
            if s2 == s1 || p2 == p1 {
                continue;
            }
            if self.slot(s1).workload(p2) > self.slot(s2).workload(p2) {
                continue;
            }

            for &(s3, p3) in units {
                if s3 == s1 || s3 == s2 || p3 == p1 || p3 == p2 {
                    continue;
                }
                if self.slot(s2).workload(p3) > self.slot(s3).workload(p3) {
                    continue;
                }

                let mut next = self.clone();
                let rotated = next.unassign(s1, p1)
                    && next.unassign(s2, p2)
                    && next.unassign(s3, p3)
                    && next.assign(s1, p2, false).is_ok()
                    && next.assign(s2, p3, false).is_ok()
                    && next.assign(s3, p1, false).is_ok();
                if rotated && next.score() > score {
                    return Some(next);
                }
            }
        }
        None
    }
}
