//! Read-only data shared by every clone of a search state.

use std::collections::HashMap;

use crate::models::{DutyCalendar, Physician, PhysicianAgenda, ShiftType};

/// Physician attributes and preference predicates, indexed by physician.
///
/// Never mutated after construction; search states hold it behind an
/// `Arc` so cloning a state does not copy it.
#[derive(Debug)]
pub(crate) struct RosterContext {
    physicians: Vec<Physician>,
    agendas: Vec<PhysicianAgenda>,
    physician_index: HashMap<String, usize>,
    slot_index: HashMap<(ShiftType, u32), usize>,
}

impl RosterContext {
    /// Aligns agendas with `physicians`. A physician without an agenda
    /// gets an empty one (quota zero, no eligible slot).
    pub(crate) fn new(
        calendar: &DutyCalendar,
        physicians: &[Physician],
        agendas: &[PhysicianAgenda],
    ) -> Self {
        let by_id: HashMap<&str, &PhysicianAgenda> = agendas
            .iter()
            .map(|a| (a.physician_id.as_str(), a))
            .collect();

        let aligned = physicians
            .iter()
            .map(|p| match by_id.get(p.id.as_str()) {
                Some(&agenda) => agenda.clone(),
                None => PhysicianAgenda::new(p.id.clone(), 0, Vec::new()),
            })
            .collect();

        let physician_index = physicians
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        let slot_index = calendar
            .slots
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.shift_type, s.day), i))
            .collect();

        Self {
            physicians: physicians.to_vec(),
            agendas: aligned,
            physician_index,
            slot_index,
        }
    }

    #[inline]
    pub(crate) fn physician_count(&self) -> usize {
        self.physicians.len()
    }

    #[inline]
    pub(crate) fn physician(&self, physician: usize) -> &Physician {
        &self.physicians[physician]
    }

    #[inline]
    pub(crate) fn agenda(&self, physician: usize) -> &PhysicianAgenda {
        &self.agendas[physician]
    }

    pub(crate) fn physician_index(&self, id: &str) -> Option<usize> {
        self.physician_index.get(id).copied()
    }

    pub(crate) fn slot_index(&self, shift_type: ShiftType, day: u32) -> Option<usize> {
        self.slot_index.get(&(shift_type, day)).copied()
    }

    #[inline]
    pub(crate) fn department(&self, physician: usize) -> &str {
        &self.physicians[physician].department
    }

    #[inline]
    pub(crate) fn experience(&self, physician: usize) -> f64 {
        self.physicians[physician].experience_years
    }

    #[inline]
    pub(crate) fn is_day_off(&self, physician: usize, day: u32) -> bool {
        self.agendas[physician].is_day_off(day)
    }

    #[inline]
    pub(crate) fn is_preferred(&self, physician: usize, day: u32, shift_type: ShiftType) -> bool {
        self.agendas[physician].is_preferred(day, shift_type)
    }

    #[inline]
    pub(crate) fn is_unpreferred(
        &self,
        physician: usize,
        day: u32,
        shift_type: ShiftType,
    ) -> bool {
        self.agendas[physician].is_unpreferred(day, shift_type)
    }
}
