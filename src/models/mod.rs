//! Rostering domain models.
//!
//! Input types handed to the matcher by upstream collaborators
//! (calendar construction, score computation) and the roster it returns.
//!
//! | Type | Role |
//! |------|------|
//! | `DutyCalendar` | Required slots of the month with capacities |
//! | `Physician` | Department and experience for pairing rules |
//! | `PhysicianAgenda` | Quota, per-slot scores, preference predicates |
//! | `Roster` | Final assignment per slot plus score |

mod physician;
mod roster;
mod shift;

pub use physician::{Physician, PhysicianAgenda};
pub use roster::{Roster, RosterEntry};
pub use shift::{CareTier, DutyCalendar, DutySlot, ShiftType};
