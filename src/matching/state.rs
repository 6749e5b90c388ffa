//! Search state: slots, quotas, and the legality checker.
//!
//! # Partitions
//! Every slot is either open (still needs physicians) or filled. Open slot
//! indices are kept in calendar order; filled ones in the order they
//! filled up.
//!
//! # Eligibility Invariant
//! On an open slot, a physician's score is positive iff the input score
//! was positive, the physician is not on the slot, and the physician has
//! quota left. `assign` and `unassign` restore this after every change.
//!
//! # Cloning
//! The search explores by cloning. Physician data lives in a shared
//! [`RosterContext`]; slots are copy-on-write, so a clone costs one
//! pointer per slot until a slot is touched.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::context::RosterContext;
use super::entry::PhysicianEntry;
use super::slot::Slot;
use crate::models::{DutyCalendar, Physician, PhysicianAgenda, Roster, RosterEntry, ShiftType};

/// Two duties of one physician must be at least this many days apart.
pub const MIN_DUTY_INTERVAL_DAYS: u32 = 5;

/// Physicians below this experience need a senior partner.
pub const BEGINNER_EXPERIENCE_YEARS: f64 = 3.0;

/// A partner must have more experience than this to count as senior.
pub const SENIOR_EXPERIENCE_YEARS: f64 = 4.0;

/// Penalty for a duty the physician wanted to avoid.
pub const UNPREFERRED_PENALTY: i32 = -10;

/// Reward for a duty the physician asked for.
pub const PREFERRED_REWARD: i32 = 1;

/// Ordering applied to candidate lists.
///
/// Sorted orders shuffle first so that equal keys come out in a
/// different order on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Natural order, no shuffling.
    #[default]
    Unspecified,
    /// Smallest key first.
    Ascending,
    /// Largest key first.
    Descending,
}

/// Why an assignment was refused.
///
/// Every variant marks an infeasible branch; the search discards the
/// state and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The slot has no room left.
    #[error("slot is already filled")]
    SlotFilled,
    /// The physician's score for the slot is not positive.
    #[error("physician is not eligible for the slot")]
    Ineligible,
    /// The physician has no quota left.
    #[error("physician has no remaining quota")]
    QuotaExhausted,
    /// Another duty of the physician is too close.
    #[error("another duty is only {days} days away")]
    TooClose {
        /// Distance to the conflicting duty.
        days: u32,
    },
    /// The physician already works one day off.
    #[error("physician already has a duty on a day off")]
    SecondDayOff,
    /// The physician already has one unpreferred duty.
    #[error("physician already has an unpreferred duty")]
    SecondUnpreferred,
    /// Every occupant is from the candidate's department.
    #[error("no occupant from another department")]
    SameDepartment,
    /// Beginner candidate without a senior occupant.
    #[error("beginner would be paired without a senior")]
    InexperiencedPair,
    /// Quota exhaustion left an open slot without candidates.
    #[error("slot {shift_type}/{day} has no eligible physician left")]
    StarvedSlot {
        /// Day of the starved slot.
        day: u32,
        /// Shift type of the starved slot.
        shift_type: ShiftType,
    },
    /// A physician can no longer reach their quota.
    #[error("physician #{physician} has fewer assignable slots than remaining quota")]
    Shortfall {
        /// Index of the physician short of slots.
        physician: usize,
    },
}

/// Full assignment state of one search branch.
#[derive(Debug, Clone)]
pub struct SearchState {
    context: Arc<RosterContext>,
    slots: Vec<Arc<Slot>>,
    entries: Vec<PhysicianEntry>,
    open: Vec<usize>,
    filled: Vec<usize>,
    pinned: Arc<HashSet<(usize, usize)>>,
}

impl SearchState {
    /// Builds the root state from the calendar and physician agendas.
    ///
    /// Non-positive or unavailable scores become `0.0` (never eligible).
    /// Physicians without quota start excluded from every slot.
    pub fn new(
        calendar: &DutyCalendar,
        physicians: &[Physician],
        agendas: &[PhysicianAgenda],
    ) -> Self {
        let context = Arc::new(RosterContext::new(calendar, physicians, agendas));
        let n = context.physician_count();

        let slots: Vec<Slot> = calendar
            .slots
            .iter()
            .enumerate()
            .map(|(j, duty)| {
                let scores = (0..n)
                    .map(|p| {
                        let agenda = context.agenda(p);
                        let raw = agenda.scores.get(j).copied().unwrap_or(0.0);
                        if !raw.is_finite()
                            || raw <= 0.0
                            || agenda.is_unavailable(duty.day, duty.shift_type)
                        {
                            0.0
                        } else if agenda.quota == 0 {
                            -raw
                        } else {
                            raw
                        }
                    })
                    .collect();
                Slot::new(duty.shift_type, duty.day, duty.capacity as usize, scores)
            })
            .collect();

        let scarcity: Vec<f64> = slots.iter().map(Slot::scarcity_score).collect();
        let entries = (0..n)
            .map(|p| {
                let quota = context.agenda(p).quota;
                let sum: f64 = slots
                    .iter()
                    .zip(&scarcity)
                    .filter(|(slot, _)| slot.is_assignable(p))
                    .map(|(_, &s)| s)
                    .sum();
                PhysicianEntry::new(quota, sum * f64::from(quota))
            })
            .collect();

        let (filled, open): (Vec<usize>, Vec<usize>) =
            (0..slots.len()).partition(|&i| slots[i].is_filled());

        Self {
            context,
            slots: slots.into_iter().map(Arc::new).collect(),
            entries,
            open,
            filled,
            pinned: Arc::default(),
        }
    }

    /// Whether every required duty is filled.
    #[inline]
    pub fn is_fulfilled(&self) -> bool {
        self.open.is_empty()
    }

    /// Number of physicians.
    #[inline]
    pub fn physician_count(&self) -> usize {
        self.entries.len()
    }

    /// Physician attributes.
    #[inline]
    pub fn physician(&self, physician: usize) -> &Physician {
        self.context.physician(physician)
    }

    /// Index of a physician by ID.
    pub fn physician_index(&self, id: &str) -> Option<usize> {
        self.context.physician_index(id)
    }

    /// Index of the slot for (`shift_type`, `day`).
    pub fn slot_index(&self, shift_type: ShiftType, day: u32) -> Option<usize> {
        self.context.slot_index(shift_type, day)
    }

    /// Slot by index.
    #[inline]
    pub fn slot(&self, slot: usize) -> &Slot {
        &self.slots[slot]
    }

    /// Slot for (`shift_type`, `day`).
    pub fn slot_at(&self, shift_type: ShiftType, day: u32) -> Option<&Slot> {
        self.slot_index(shift_type, day).map(|i| self.slot(i))
    }

    /// Quota entry of a physician.
    #[inline]
    pub fn entry(&self, physician: usize) -> &PhysicianEntry {
        &self.entries[physician]
    }

    /// Remaining quota of a physician.
    #[inline]
    pub fn remaining_quota(&self, physician: usize) -> u32 {
        self.entries[physician].remaining()
    }

    /// Open slot indices, calendar order.
    #[inline]
    pub fn open_slots(&self) -> &[usize] {
        &self.open
    }

    /// Filled slot indices, fill order.
    #[inline]
    pub fn filled_slots(&self) -> &[usize] {
        &self.filled
    }

    /// Number of open slots.
    #[inline]
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Number of filled slots.
    #[inline]
    pub fn filled_count(&self) -> usize {
        self.filled.len()
    }

    /// Sum of capacities over all slots.
    pub fn total_capacity(&self) -> usize {
        self.slots.iter().map(|s| s.capacity()).sum()
    }

    /// Slots a physician currently holds, calendar order.
    pub fn assigned_slots(&self, physician: usize) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].is_assigned(physician))
            .collect()
    }

    /// Physician IDs on (`shift_type`, `day`).
    pub fn assigned(&self, shift_type: ShiftType, day: u32) -> Vec<&str> {
        self.slot_at(shift_type, day)
            .map(|slot| {
                slot.assigned()
                    .iter()
                    .map(|&p| self.physician(p).id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[inline]
    fn slot_mut(&mut self, slot: usize) -> &mut Slot {
        Arc::make_mut(&mut self.slots[slot])
    }

    /// Places `physician` on `slot`.
    ///
    /// Eligibility (positive score, quota left, room on the slot) is
    /// always required. Unless `force` is set, the spacing, day-off,
    /// unpreferred, and pairing rules apply as well.
    ///
    /// After the move, an exhausted quota removes the physician from every
    /// open slot, and every physician with quota left must still have at
    /// least as many assignable slots as duties to take.
    ///
    /// # Errors
    /// A rule violation returns before anything changes. A
    /// [`Rejection::StarvedSlot`] or [`Rejection::Shortfall`] is detected
    /// after the move; the state is then a dead branch and must be
    /// discarded.
    pub fn assign(&mut self, slot: usize, physician: usize, force: bool) -> Result<(), Rejection> {
        let target = &self.slots[slot];
        if target.is_filled() {
            return Err(Rejection::SlotFilled);
        }
        if !target.is_assignable(physician) {
            return Err(Rejection::Ineligible);
        }
        if self.entries[physician].remaining() == 0 {
            return Err(Rejection::QuotaExhausted);
        }
        if !force {
            self.check_rules(slot, physician)?;
        }

        let room = self.slot_mut(slot).assign(physician);
        let remaining = self.entries[physician].assign();

        if room == 0 {
            self.open.retain(|&s| s != slot);
            self.filled.push(slot);
        }

        if remaining == 0 {
            for i in 0..self.open.len() {
                let s = self.open[i];
                if self.slots[s].is_assignable(physician) {
                    self.slot_mut(s).deactivate(physician);
                }
                let starved = &self.slots[s];
                if starved.available_count() == 0 {
                    return Err(Rejection::StarvedSlot {
                        day: starved.day(),
                        shift_type: starved.shift_type(),
                    });
                }
            }
        }

        match self.shortfall() {
            Some(p) => Err(Rejection::Shortfall { physician: p }),
            None => Ok(()),
        }
    }

    /// Forced [`assign`](Self::assign) that also marks the duty as pinned.
    ///
    /// Refinement never moves a pinned duty.
    ///
    /// # Errors
    /// Same as a forced `assign`.
    pub fn pin(&mut self, slot: usize, physician: usize) -> Result<(), Rejection> {
        self.assign(slot, physician, true)?;
        Arc::make_mut(&mut self.pinned).insert((slot, physician));
        Ok(())
    }

    /// Whether `physician` was pinned to `slot`.
    #[inline]
    pub fn is_pinned(&self, slot: usize, physician: usize) -> bool {
        self.pinned.contains(&(slot, physician))
    }

    /// Removes `physician` from `slot`.
    ///
    /// A slot that was filled goes back to the open partition and its
    /// eligibility is recomputed from current quotas. A physician whose
    /// quota goes from zero to one becomes eligible again on every open
    /// slot they do not occupy. Returns `false` if the physician was not
    /// on the slot.
    pub fn unassign(&mut self, slot: usize, physician: usize) -> bool {
        if !self.slots[slot].is_assigned(physician) {
            return false;
        }
        let was_filled = self.slots[slot].is_filled();
        if self.is_pinned(slot, physician) {
            Arc::make_mut(&mut self.pinned).remove(&(slot, physician));
        }

        self.slot_mut(slot).unassign(physician);
        let remaining = self.entries[physician].unassign();

        if was_filled {
            self.filled.retain(|&s| s != slot);
            let at = self.open.partition_point(|&s| s < slot);
            self.open.insert(at, slot);
            self.refresh_eligibility(slot);
        }

        if remaining == 1 {
            for i in 0..self.open.len() {
                let s = self.open[i];
                let current = &self.slots[s];
                if !current.is_assigned(physician) && current.score(physician) < 0.0 {
                    self.slot_mut(s).activate(physician);
                }
            }
        }
        true
    }

    /// Re-derives signs on a reopened slot from occupancy and quotas.
    fn refresh_eligibility(&mut self, slot: usize) {
        for p in 0..self.entries.len() {
            let current = &self.slots[slot];
            if current.is_assigned(p) || current.score(p) == 0.0 {
                continue;
            }
            let should_be_active = self.entries[p].remaining() > 0;
            if should_be_active != current.is_assignable(p) {
                if should_be_active {
                    self.slot_mut(slot).activate(p);
                } else {
                    self.slot_mut(slot).deactivate(p);
                }
            }
        }
    }

    /// Rules 2-5: spacing, day-off limit, unpreferred limit, pairing.
    fn check_rules(&self, slot: usize, physician: usize) -> Result<(), Rejection> {
        let ctx = &self.context;
        let target = &self.slots[slot];
        let (day, shift_type) = (target.day(), target.shift_type());

        let mut holds_day_off = false;
        let mut holds_unpreferred = false;
        for other in self.slots.iter().filter(|s| s.is_assigned(physician)) {
            let days = other.interval(target);
            if days < MIN_DUTY_INTERVAL_DAYS {
                return Err(Rejection::TooClose { days });
            }
            holds_day_off |= ctx.is_day_off(physician, other.day());
            holds_unpreferred |= ctx.is_unpreferred(physician, other.day(), other.shift_type());
        }

        if holds_day_off && ctx.is_day_off(physician, day) {
            return Err(Rejection::SecondDayOff);
        }
        if holds_unpreferred && ctx.is_unpreferred(physician, day, shift_type) {
            return Err(Rejection::SecondUnpreferred);
        }

        let occupants = target.assigned();
        if !occupants.is_empty() {
            let department = ctx.department(physician);
            if !occupants.iter().any(|&o| ctx.department(o) != department) {
                return Err(Rejection::SameDepartment);
            }
            if ctx.experience(physician) < BEGINNER_EXPERIENCE_YEARS
                && !occupants
                    .iter()
                    .any(|&o| ctx.experience(o) > SENIOR_EXPERIENCE_YEARS)
            {
                return Err(Rejection::InexperiencedPair);
            }
        }
        Ok(())
    }

    /// First physician whose assignable slots cannot cover their quota.
    fn shortfall(&self) -> Option<usize> {
        (0..self.entries.len()).find(|&p| {
            let remaining = self.entries[p].remaining() as usize;
            remaining > 0 && self.assignable_count(p) < remaining
        })
    }

    fn assignable_count(&self, physician: usize) -> usize {
        self.open
            .iter()
            .filter(|&&s| self.slots[s].is_assignable(physician))
            .count()
    }

    /// Open slots the physician is eligible for, ordered by the
    /// physician's score.
    pub fn assignable_slots<R: Rng + ?Sized>(
        &self,
        physician: usize,
        order: SortOrder,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .open
            .iter()
            .copied()
            .filter(|&s| self.slots[s].is_assignable(physician))
            .collect();
        arrange(&mut slots, order, rng, |s| self.slots[s].score(physician));
        slots
    }

    /// Physicians eligible for `slot`, ordered by their score for it.
    pub fn available_physicians_for<R: Rng + ?Sized>(
        &self,
        slot: usize,
        order: SortOrder,
        rng: &mut R,
    ) -> Vec<usize> {
        let target = &self.slots[slot];
        let mut physicians: Vec<usize> = (0..self.entries.len())
            .filter(|&p| target.is_assignable(p))
            .collect();
        arrange(&mut physicians, order, rng, |p| target.score(p));
        physicians
    }

    /// Physicians with quota left, ordered by contribution.
    pub fn available_physicians<R: Rng + ?Sized>(&self, order: SortOrder, rng: &mut R) -> Vec<usize> {
        let mut physicians: Vec<usize> = (0..self.entries.len())
            .filter(|&p| self.entries[p].remaining() > 0)
            .collect();
        arrange(&mut physicians, order, rng, |p| self.entries[p].contribution());
        physicians
    }

    /// Physicians with exactly as many assignable slots as remaining quota.
    pub fn inflexible_physicians(&self) -> Vec<usize> {
        (0..self.entries.len())
            .filter(|&p| {
                let remaining = self.entries[p].remaining() as usize;
                remaining > 0 && self.assignable_count(p) == remaining
            })
            .collect()
    }

    /// Whether the physician asked for the slot.
    pub fn is_preferred_duty(&self, slot: usize, physician: usize) -> bool {
        let s = &self.slots[slot];
        self.context.is_preferred(physician, s.day(), s.shift_type())
    }

    /// Whether the physician wanted to avoid the slot.
    pub fn is_unpreferred_duty(&self, slot: usize, physician: usize) -> bool {
        let s = &self.slots[slot];
        self.context.is_unpreferred(physician, s.day(), s.shift_type())
    }

    /// Filled (slot, physician) pairs in fill order.
    pub fn filled_units(&self) -> Vec<(usize, usize)> {
        self.filled
            .iter()
            .flat_map(|&s| self.slots[s].assigned().iter().map(move |&p| (s, p)))
            .collect()
    }

    /// Preference objective over filled slots.
    ///
    /// `-10` per unpreferred duty, `+1` per preferred duty.
    pub fn score(&self) -> i32 {
        self.filled_units()
            .into_iter()
            .map(|(s, p)| {
                if self.is_unpreferred_duty(s, p) {
                    UNPREFERRED_PENALTY
                } else if self.is_preferred_duty(s, p) {
                    PREFERRED_REWARD
                } else {
                    0
                }
            })
            .sum()
    }

    /// Current assignment as a roster, calendar order.
    pub fn to_roster(&self) -> Roster {
        let entries = self
            .slots
            .iter()
            .map(|slot| {
                RosterEntry::new(
                    slot.day(),
                    slot.shift_type(),
                    slot.assigned()
                        .iter()
                        .map(|&p| self.physician(p).id.clone())
                        .collect(),
                )
            })
            .collect();
        Roster {
            entries,
            score: self.score(),
        }
    }
}

/// Shuffles, then stable-sorts by `key` in the requested direction.
fn arrange<R, K>(items: &mut [usize], order: SortOrder, rng: &mut R, key: K)
where
    R: Rng + ?Sized,
    K: Fn(usize) -> f64,
{
    match order {
        SortOrder::Unspecified => {}
        SortOrder::Ascending => {
            items.shuffle(rng);
            items.sort_by(|&a, &b| key(a).total_cmp(&key(b)));
        }
        SortOrder::Descending => {
            items.shuffle(rng);
            items.sort_by(|&a, &b| key(b).total_cmp(&key(a)));
        }
    }
}
