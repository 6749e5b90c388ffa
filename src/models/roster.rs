//! Roster (solution) model.
//!
//! A roster is the final physician assignment for every duty slot of a
//! month, together with its preference-satisfaction score.

use serde::{Deserialize, Serialize};

use super::{DutyCalendar, ShiftType};

/// A complete or partial duty roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// One entry per calendar slot, in calendar order.
    pub entries: Vec<RosterEntry>,
    /// Preference-satisfaction score (higher is better).
    pub score: i32,
}

/// Physicians assigned to one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Day of month.
    pub day: u32,
    /// Shift type.
    pub shift_type: ShiftType,
    /// Assigned physician IDs, in assignment order.
    pub physician_ids: Vec<String>,
}

impl RosterEntry {
    /// Creates an entry.
    pub fn new(day: u32, shift_type: ShiftType, physician_ids: Vec<String>) -> Self {
        Self {
            day,
            shift_type,
            physician_ids,
        }
    }

    /// Whether `physician_id` holds this duty.
    pub fn contains(&self, physician_id: &str) -> bool {
        self.physician_ids.iter().any(|id| id == physician_id)
    }
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for (`shift_type`, `day`).
    pub fn entry(&self, shift_type: ShiftType, day: u32) -> Option<&RosterEntry> {
        self.entries
            .iter()
            .find(|e| e.shift_type == shift_type && e.day == day)
    }

    /// Entries held by a physician.
    pub fn duties_of(&self, physician_id: &str) -> Vec<&RosterEntry> {
        self.entries
            .iter()
            .filter(|e| e.contains(physician_id))
            .collect()
    }

    /// Number of duties held by a physician.
    pub fn duty_count(&self, physician_id: &str) -> usize {
        self.entries.iter().filter(|e| e.contains(physician_id)).count()
    }

    /// Total number of assigned duties.
    pub fn assignment_count(&self) -> usize {
        self.entries.iter().map(|e| e.physician_ids.len()).sum()
    }

    /// Whether every calendar slot is staffed to capacity.
    pub fn is_complete(&self, calendar: &DutyCalendar) -> bool {
        calendar.slots.iter().all(|slot| {
            self.entry(slot.shift_type, slot.day)
                .is_some_and(|e| e.physician_ids.len() == slot.capacity as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_roster() -> Roster {
        Roster {
            entries: vec![
                RosterEntry::new(1, ShiftType::Night, vec!["P1".into()]),
                RosterEntry::new(2, ShiftType::Day, vec!["P2".into(), "P3".into()]),
                RosterEntry::new(8, ShiftType::Night, vec!["P1".into()]),
            ],
            score: 1,
        }
    }

    #[test]
    fn test_duties_of() {
        let r = sample_roster();
        assert_eq!(r.duty_count("P1"), 2);
        assert_eq!(r.duties_of("P3").len(), 1);
        assert_eq!(r.duty_count("P9"), 0);
        assert_eq!(r.assignment_count(), 4);
    }

    #[test]
    fn test_entry_lookup() {
        let r = sample_roster();
        let e = r.entry(ShiftType::Day, 2).unwrap();
        assert!(e.contains("P2"));
        assert!(r.entry(ShiftType::Day, 1).is_none());
    }

    #[test]
    fn test_is_complete() {
        let r = sample_roster();
        let full = DutyCalendar::new(30)
            .with_slot(1, ShiftType::Night, 1)
            .with_slot(2, ShiftType::Day, 2)
            .with_slot(8, ShiftType::Night, 1);
        assert!(r.is_complete(&full));

        let bigger = full.clone().with_slot(9, ShiftType::Night, 1);
        assert!(!r.is_complete(&bigger));
    }

    #[test]
    fn test_roster_serialization() {
        let r = sample_roster();
        let json = serde_json::to_string(&r).unwrap();
        let back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries, r.entries);
        assert_eq!(back.score, 1);
    }
}
