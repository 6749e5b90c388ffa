//! Duty slot and monthly duty calendar models.
//!
//! A calendar lists every required duty slot of a month in day order.
//! Which days are holidays or 2nd-tier is decided upstream; the calendar
//! only records the resulting slots and their capacities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of duty within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftType {
    /// Daytime duty (holiday day shift).
    Day,
    /// Overnight duty.
    Night,
}

impl ShiftType {
    /// Both shift types, day first.
    pub const ALL: [ShiftType; 2] = [ShiftType::Day, ShiftType::Night];

    /// One-letter code (`D` / `N`).
    pub fn code(self) -> char {
        match self {
            ShiftType::Day => 'D',
            ShiftType::Night => 'N',
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Emergency-care designation of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CareTier {
    /// Regular (1st-tier) emergency coverage.
    #[default]
    Primary,
    /// Elevated (2nd-tier) coverage; doubles the capacity of every shift.
    Secondary,
}

impl CareTier {
    /// Number of physicians required per shift on a day of this tier.
    #[inline]
    pub fn capacity(self) -> u32 {
        match self {
            CareTier::Primary => 1,
            CareTier::Secondary => 2,
        }
    }
}

/// One required duty slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySlot {
    /// Day of month (1-based).
    pub day: u32,
    /// Shift type.
    pub shift_type: ShiftType,
    /// Number of physicians required (>= 1).
    pub capacity: u32,
}

impl DutySlot {
    /// Creates a new duty slot.
    pub fn new(day: u32, shift_type: ShiftType, capacity: u32) -> Self {
        Self {
            day,
            shift_type,
            capacity,
        }
    }
}

/// Required duty slots of one month, in calendar order.
///
/// The slot order defines the column order of every
/// [`PhysicianAgenda::scores`](super::PhysicianAgenda) vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DutyCalendar {
    /// Number of days in the month.
    pub days: u32,
    /// Required slots, ordered by day then insertion.
    pub slots: Vec<DutySlot>,
}

impl DutyCalendar {
    /// Creates an empty calendar for a month of `days` days.
    pub fn new(days: u32) -> Self {
        Self {
            days,
            slots: Vec::new(),
        }
    }

    /// Appends a slot with an explicit capacity.
    pub fn with_slot(mut self, day: u32, shift_type: ShiftType, capacity: u32) -> Self {
        self.slots.push(DutySlot::new(day, shift_type, capacity));
        self
    }

    /// Appends one slot per shift type for `day`, sized by the day's tier.
    pub fn with_day(mut self, day: u32, shift_types: &[ShiftType], tier: CareTier) -> Self {
        for &shift_type in shift_types {
            self.slots
                .push(DutySlot::new(day, shift_type, tier.capacity()));
        }
        self
    }

    /// Number of distinct slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total number of duties to fill (sum of capacities).
    pub fn required_duties(&self) -> u32 {
        self.slots.iter().map(|s| s.capacity).sum()
    }

    /// Index of the slot for (`shift_type`, `day`), if present.
    pub fn position(&self, shift_type: ShiftType, day: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.shift_type == shift_type && s.day == day)
    }

    /// Slots falling on `day`.
    pub fn slots_on(&self, day: u32) -> impl Iterator<Item = &DutySlot> {
        self.slots.iter().filter(move |s| s.day == day)
    }
}
