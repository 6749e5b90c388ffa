//! Per-physician quota counter.

/// Remaining quota and priority metric of one physician.
///
/// A plain counter: legality lives in
/// [`SearchState`](super::SearchState).
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicianEntry {
    remaining: u32,
    contribution: f64,
}

impl PhysicianEntry {
    /// Creates an entry.
    pub fn new(remaining: u32, contribution: f64) -> Self {
        Self {
            remaining,
            contribution,
        }
    }

    /// Duties still to assign.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Summed scarcity of the physician's eligible slots times quota.
    #[inline]
    pub fn contribution(&self) -> f64 {
        self.contribution
    }

    /// Consumes one duty and returns what is left.
    pub fn assign(&mut self) -> u32 {
        debug_assert!(self.remaining > 0);
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    /// Gives one duty back and returns what is left.
    pub fn unassign(&mut self) -> u32 {
        self.remaining += 1;
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let mut e = PhysicianEntry::new(2, 4.5);
        assert_eq!(e.assign(), 1);
        assert_eq!(e.assign(), 0);
        assert_eq!(e.unassign(), 1);
        assert_eq!(e.remaining(), 1);
        assert!((e.contribution() - 4.5).abs() < 1e-10);
    }
}
