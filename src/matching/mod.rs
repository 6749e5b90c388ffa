//! Duty matching engine.
//!
//! Assigns physicians to the slots of a [`DutyCalendar`](crate::models::DutyCalendar)
//! with a randomized backtracking search run on several threads, then
//! improves each complete roster with swap-based refinement.
//!
//! # Components
//!
//! - [`Slot`] and [`PhysicianEntry`]: per-slot occupancy and per-physician quota
//! - [`SearchState`]: legality checks, quota cascades, views, refinement
//! - [`SearchWorker`]: three-tier backtracking over cloned states
//! - [`SolutionPool`]: thread-safe collection of complete rosters
//! - [`Matcher`]: manual pins, parallel orchestration, best-roster selection
//!
//! # Hard rules
//!
//! Beyond eligibility and quota, a physician may not take:
//! - two duties fewer than [`MIN_DUTY_INTERVAL_DAYS`] days apart
//! - more than one duty on a personal day off
//! - more than one duty they asked to avoid
//! - a shared slot where every partner is from their own department
//! - a shared slot as a beginner without a senior partner
//!
//! Manual pins skip these rules.

mod config;
mod context;
mod entry;
mod matcher;
mod pool;
mod progress;
mod refine;
mod slot;
mod state;
mod worker;

pub use config::{MatchConfig, SearchLimits, RECURSION_SLACK};
pub use entry::PhysicianEntry;
pub use matcher::Matcher;
pub use pool::SolutionPool;
pub use progress::{ProgressListener, SolutionFound};
pub use slot::Slot;
pub use state::{
    Rejection, SearchState, SortOrder, BEGINNER_EXPERIENCE_YEARS, MIN_DUTY_INTERVAL_DAYS,
    PREFERRED_REWARD, SENIOR_EXPERIENCE_YEARS, UNPREFERRED_PENALTY,
};
pub use worker::SearchWorker;

#[cfg(test)]
pub(crate) mod testing {
    use crate::models::{DutyCalendar, Physician, ShiftType};

    pub fn doctor(id: &str, department: &str, experience_years: f64) -> Physician {
        Physician::new(id)
            .with_name(id)
            .with_department(department)
            .with_experience(experience_years)
    }

    /// N/1 and N/15, one physician each.
    pub fn two_night_calendar() -> DutyCalendar {
        DutyCalendar::new(30)
            .with_slot(1, ShiftType::Night, 1)
            .with_slot(15, ShiftType::Night, 1)
    }
}
