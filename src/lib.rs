//! Physician duty rostering for the U-Engine ecosystem.
//!
//! Assigns physicians to the day and night duties of a month under hard
//! eligibility, quota, spacing, and pairing rules, and optimizes a
//! secondary preference score.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `DutyCalendar`, `DutySlot`, `ShiftType`,
//!   `CareTier`, `Physician`, `PhysicianAgenda`, `Roster`
//! - **`validation`**: Input integrity checks (duplicate IDs, score shapes, quota totals)
//! - **`matching`**: Search state, parallel backtracking matcher, swap refinement
//! - **`kpi`**: Preference and workload metrics of a finished roster
//! - **`error`**: Error types
//!
//! # Architecture
//!
//! Callers compute a score for every (physician, slot) pair and hand it to
//! [`matching::Matcher`] together with quotas and preference predicates.
//! How scores are derived, how calendars are built, and how rosters are
//! stored stay outside this crate.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6:
//!   Constraint Satisfaction Problems

pub mod error;
pub mod kpi;
pub mod matching;
pub mod models;
pub mod validation;

pub use error::{ConfigError, RosterError};
pub use matching::{MatchConfig, Matcher};
