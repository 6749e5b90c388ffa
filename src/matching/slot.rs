//! One duty-slot instance inside a search state.
//!
//! The score vector doubles as the eligibility mask: a positive entry
//! means the physician may still take this slot, a negative entry means
//! the physician is temporarily excluded (already on the slot, or out of
//! quota) and zero means never eligible. Flipping the sign keeps the
//! workload magnitude so it can be restored later.

use crate::models::ShiftType;

/// A duty slot with its per-physician scores and current occupants.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    shift_type: ShiftType,
    day: u32,
    capacity: usize,
    scores: Vec<f64>,
    assigned: Vec<usize>,
}

impl Slot {
    /// Creates an empty slot. `scores` is indexed by physician.
    pub fn new(shift_type: ShiftType, day: u32, capacity: usize, scores: Vec<f64>) -> Self {
        Self {
            shift_type,
            day,
            capacity,
            scores,
            assigned: Vec::with_capacity(capacity),
        }
    }

    /// Shift type.
    #[inline]
    pub fn shift_type(&self) -> ShiftType {
        self.shift_type
    }

    /// Day of month.
    #[inline]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Number of physicians the slot needs.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Physicians on this slot, in assignment order.
    #[inline]
    pub fn assigned(&self) -> &[usize] {
        &self.assigned
    }

    /// Signed score of a physician for this slot.
    #[inline]
    pub fn score(&self, physician: usize) -> f64 {
        self.scores[physician]
    }

    /// Workload of a physician for this slot, regardless of eligibility.
    #[inline]
    pub fn workload(&self, physician: usize) -> f64 {
        self.scores[physician].abs()
    }

    /// Whether every place is taken.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.assigned.len() == self.capacity
    }

    /// Free places left.
    #[inline]
    pub fn room(&self) -> usize {
        self.capacity - self.assigned.len()
    }

    /// Whether the physician is currently eligible.
    #[inline]
    pub fn is_assignable(&self, physician: usize) -> bool {
        self.scores[physician] > 0.0
    }

    /// Whether the physician holds a place on this slot.
    #[inline]
    pub fn is_assigned(&self, physician: usize) -> bool {
        self.assigned.contains(&physician)
    }

    /// Number of currently eligible physicians.
    pub fn available_count(&self) -> usize {
        self.scores.iter().filter(|&&s| s > 0.0).count()
    }

    /// Scarcity-weighted workload of this slot.
    ///
    /// Average positive score times the fraction of eligible physicians.
    /// Slots few physicians can take, or that weigh heavily on those who
    /// can, score higher. Zero when nobody is eligible.
    pub fn scarcity_score(&self) -> f64 {
        let (sum, count) = self
            .scores
            .iter()
            .filter(|&&s| s > 0.0)
            .fold((0.0, 0usize), |(sum, n), &s| (sum + s, n + 1));
        if count == 0 {
            return 0.0;
        }
        let average = sum / count as f64;
        average * count as f64 / self.scores.len() as f64
    }

    /// Distance in days to another slot.
    #[inline]
    pub fn interval(&self, other: &Slot) -> u32 {
        self.day.abs_diff(other.day)
    }

    /// Makes the physician eligible again, keeping the magnitude.
    #[inline]
    pub fn activate(&mut self, physician: usize) {
        self.scores[physician] = self.scores[physician].abs();
    }

    /// Excludes the physician, keeping the magnitude.
    #[inline]
    pub fn deactivate(&mut self, physician: usize) {
        self.scores[physician] = -self.scores[physician].abs();
    }

    /// Puts a physician on the slot and returns the remaining room.
    pub fn assign(&mut self, physician: usize) -> usize {
        debug_assert!(!self.is_filled());
        debug_assert!(!self.is_assigned(physician));
        debug_assert!(self.is_assignable(physician));
        self.deactivate(physician);
        self.assigned.push(physician);
        self.room()
    }

    /// Removes a physician from the slot and returns the remaining room.
    pub fn unassign(&mut self, physician: usize) -> usize {
        debug_assert!(self.is_assigned(physician));
        self.activate(physician);
        self.assigned.retain(|&p| p != physician);
        self.room()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn night(day: u32, capacity: usize, scores: Vec<f64>) -> Slot {
        Slot::new(ShiftType::Night, day, capacity, scores)
    }

    #[test]
    fn test_assign_and_unassign_room() {
        let mut s = night(10, 2, vec![1.2, 0.9, 0.9]);
        assert_eq!(s.assign(1), 1);
        assert!(!s.is_filled());
        assert_eq!(s.assign(2), 0);
        assert!(s.is_filled());
        assert_eq!(s.assigned(), &[1, 2]);

        assert_eq!(s.unassign(1), 1);
        assert_eq!(s.assigned(), &[2]);
        assert!(s.is_assignable(1));
        assert!(!s.is_assignable(2));
    }

    #[test]
    fn test_activation_keeps_magnitude() {
        let mut s = night(3, 1, vec![1.5, 0.0]);
        s.deactivate(0);
        assert!(!s.is_assignable(0));
        assert!((s.workload(0) - 1.5).abs() < 1e-10);
        s.activate(0);
        assert!((s.score(0) - 1.5).abs() < 1e-10);

        // Zero stays ineligible
        s.activate(1);
        assert!(!s.is_assignable(1));
    }

    #[test]
    fn test_available_count() {
        let mut s = night(1, 1, vec![1.0, 0.0, 2.0, 1.0]);
        assert_eq!(s.available_count(), 3);
        s.deactivate(2);
        assert_eq!(s.available_count(), 2);
    }

    #[test]
    fn test_scarcity_score() {
        // avg(1.0, 2.0) * 2/4 = 0.75
        let s = night(1, 1, vec![1.0, 0.0, 2.0, 0.0]);
        assert!((s.scarcity_score() - 0.75).abs() < 1e-10);

        let empty = night(1, 1, vec![0.0, -1.0]);
        assert_eq!(empty.scarcity_score(), 0.0);
    }

    #[test]
    fn test_interval() {
        let a = night(3, 1, vec![]);
        let b = Slot::new(ShiftType::Day, 8, 1, vec![]);
        assert_eq!(a.interval(&b), 5);
        assert_eq!(b.interval(&a), 5);
    }
}
