//! Physician and per-physician agenda models.
//!
//! A [`Physician`] carries the attributes the pairing rules look at
//! (department, experience). A [`PhysicianAgenda`] carries everything
//! the upstream scoring step computed for one physician and one month:
//! remaining quota, per-slot workload scores, and preference predicates.
//!
//! # Score Convention
//! `scores[j]` refers to `DutyCalendar::slots[j]`. A positive score means
//! the physician may take the slot and its magnitude is the relative
//! workload; zero or negative means ineligible.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ShiftType;

/// A physician who can take duties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Physician {
    /// Unique physician identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Clinical department (pairing rule: avoid same-department pairs).
    pub department: String,
    /// Years since graduation (pairing rule: avoid two beginners).
    pub experience_years: f64,
}

impl Physician {
    /// Creates a physician with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: String::new(),
            experience_years: 0.0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the years of experience.
    pub fn with_experience(mut self, years: f64) -> Self {
        self.experience_years = years;
        self
    }
}

/// Monthly duty agenda for one physician.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicianAgenda {
    /// Physician this agenda belongs to.
    pub physician_id: String,
    /// Remaining number of duties to assign this month.
    pub quota: u32,
    /// Workload score per calendar slot.
    pub scores: Vec<f64>,
    /// Days off (holidays, weekly days off).
    pub day_offs: HashSet<u32>,
    /// Requested duties.
    pub preferred: HashSet<(u32, ShiftType)>,
    /// Duties the physician would rather avoid.
    pub unpreferred: HashSet<(u32, ShiftType)>,
    /// Duties the physician cannot take.
    pub unavailable: HashSet<(u32, ShiftType)>,
}

impl PhysicianAgenda {
    /// Creates an agenda with a quota and per-slot scores.
    pub fn new(physician_id: impl Into<String>, quota: u32, scores: Vec<f64>) -> Self {
        Self {
            physician_id: physician_id.into(),
            quota,
            scores,
            day_offs: HashSet::new(),
            preferred: HashSet::new(),
            unpreferred: HashSet::new(),
            unavailable: HashSet::new(),
        }
    }

    /// Marks a day off.
    pub fn with_day_off(mut self, day: u32) -> Self {
        self.day_offs.insert(day);
        self
    }

    /// Marks a single duty as preferred.
    pub fn with_preferred(mut self, day: u32, shift_type: ShiftType) -> Self {
        self.preferred.insert((day, shift_type));
        self
    }

    /// Marks every duty of a day as preferred.
    pub fn with_preferred_day(mut self, day: u32) -> Self {
        self.preferred
            .extend(ShiftType::ALL.iter().map(|&t| (day, t)));
        self
    }

    /// Marks a single duty as unpreferred.
    pub fn with_unpreferred(mut self, day: u32, shift_type: ShiftType) -> Self {
        self.unpreferred.insert((day, shift_type));
        self
    }

    /// Marks every duty of a day as unpreferred.
    pub fn with_unpreferred_day(mut self, day: u32) -> Self {
        self.unpreferred
            .extend(ShiftType::ALL.iter().map(|&t| (day, t)));
        self
    }

    /// Marks a single duty as unavailable.
    pub fn with_unavailable(mut self, day: u32, shift_type: ShiftType) -> Self {
        self.unavailable.insert((day, shift_type));
        self
    }

    /// Marks every duty of a day as unavailable.
    pub fn with_unavailable_day(mut self, day: u32) -> Self {
        self.unavailable
            .extend(ShiftType::ALL.iter().map(|&t| (day, t)));
        self
    }

    /// Whether `day` is one of the physician's days off.
    #[inline]
    pub fn is_day_off(&self, day: u32) -> bool {
        self.day_offs.contains(&day)
    }

    /// Whether the duty was requested.
    ///
    /// An unpreferred mark on the same duty wins over a preferred one.
    #[inline]
    pub fn is_preferred(&self, day: u32, shift_type: ShiftType) -> bool {
        self.preferred.contains(&(day, shift_type)) && !self.is_unpreferred(day, shift_type)
    }

    /// Whether the physician would rather avoid the duty.
    #[inline]
    pub fn is_unpreferred(&self, day: u32, shift_type: ShiftType) -> bool {
        self.unpreferred.contains(&(day, shift_type))
    }

    /// Whether the physician cannot take the duty.
    #[inline]
    pub fn is_unavailable(&self, day: u32, shift_type: ShiftType) -> bool {
        self.unavailable.contains(&(day, shift_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physician_builder() {
        let p = Physician::new("P1")
            .with_name("Dr. Sato")
            .with_department("Cardiology")
            .with_experience(6.5);

        assert_eq!(p.id, "P1");
        assert_eq!(p.department, "Cardiology");
        assert!((p.experience_years - 6.5).abs() < 1e-10);
    }

    #[test]
    fn test_unpreferred_overrides_preferred() {
        let a = PhysicianAgenda::new("P1", 3, vec![1.0; 4])
            .with_preferred_day(10)
            .with_unpreferred(10, ShiftType::Night);

        assert!(a.is_preferred(10, ShiftType::Day));
        assert!(!a.is_preferred(10, ShiftType::Night));
        assert!(a.is_unpreferred(10, ShiftType::Night));
    }

    #[test]
    fn test_day_predicates() {
        let a = PhysicianAgenda::new("P1", 2, Vec::new())
            .with_day_off(6)
            .with_unavailable_day(12);

        assert!(a.is_day_off(6));
        assert!(!a.is_day_off(7));
        assert!(a.is_unavailable(12, ShiftType::Day));
        assert!(a.is_unavailable(12, ShiftType::Night));
        assert!(!a.is_unavailable(13, ShiftType::Day));
    }
}
