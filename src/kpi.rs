//! Roster quality metrics (KPIs).
//!
//! Computes preference and workload indicators from a finished roster and
//! the agendas it was built from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total duties | Physician places filled |
//! | Preferred / unpreferred | Duties on requested / avoided slots |
//! | Day-off duties | Duties on a physician's day off |
//! | Workload | Sum of the physician's scores over their duties |
//! | Workload spread | Min, max, and mean workload over all agendas |

use std::collections::HashMap;

use crate::matching::{PREFERRED_REWARD, UNPREFERRED_PENALTY};
use crate::models::{DutyCalendar, PhysicianAgenda, Roster};

/// Roster quality indicators.
#[derive(Debug, Clone)]
pub struct RosterKpi {
    /// Filled physician places.
    pub total_duties: usize,
    /// Duties the physician asked for.
    pub preferred_duties: usize,
    /// Duties the physician wanted to avoid.
    pub unpreferred_duties: usize,
    /// Duties falling on a physician's day off.
    pub day_off_duties: usize,
    /// Duty count per physician ID.
    pub duties_by_physician: HashMap<String, usize>,
    /// Summed score per physician ID.
    pub workload_by_physician: HashMap<String, f64>,
    /// Lightest workload over all agendas.
    pub min_workload: f64,
    /// Heaviest workload over all agendas.
    pub max_workload: f64,
    /// Mean workload over all agendas.
    pub mean_workload: f64,
}

impl RosterKpi {
    /// Computes KPIs for `roster`.
    ///
    /// Physicians without duties count with zero workload. Roster entries
    /// for physicians without an agenda only count towards `total_duties`.
    pub fn calculate(roster: &Roster, calendar: &DutyCalendar, agendas: &[PhysicianAgenda]) -> Self {
        let by_id: HashMap<&str, &PhysicianAgenda> = agendas
            .iter()
            .map(|a| (a.physician_id.as_str(), a))
            .collect();

        let mut duties_by_physician: HashMap<String, usize> = agendas
            .iter()
            .map(|a| (a.physician_id.clone(), 0))
            .collect();
        let mut workload_by_physician: HashMap<String, f64> = agendas
            .iter()
            .map(|a| (a.physician_id.clone(), 0.0))
            .collect();

        let mut total_duties = 0;
        let mut preferred_duties = 0;
        let mut unpreferred_duties = 0;
        let mut day_off_duties = 0;

        for entry in &roster.entries {
            let position = calendar.position(entry.shift_type, entry.day);
            for id in &entry.physician_ids {
                total_duties += 1;
                let Some(agenda) = by_id.get(id.as_str()) else {
                    continue;
                };

                if agenda.is_unpreferred(entry.day, entry.shift_type) {
                    unpreferred_duties += 1;
                } else if agenda.is_preferred(entry.day, entry.shift_type) {
                    preferred_duties += 1;
                }
                if agenda.is_day_off(entry.day) {
                    day_off_duties += 1;
                }

                *duties_by_physician.entry(id.clone()).or_insert(0) += 1;
                let score = position
                    .and_then(|j| agenda.scores.get(j))
                    .map_or(0.0, |s| s.abs());
                *workload_by_physician.entry(id.clone()).or_insert(0.0) += score;
            }
        }

        let (min_workload, max_workload, mean_workload) = if workload_by_physician.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let values = workload_by_physician.values();
            let min = values.clone().copied().fold(f64::INFINITY, f64::min);
            let max = values.clone().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.sum::<f64>() / workload_by_physician.len() as f64;
            (min, max, mean)
        };

        Self {
            total_duties,
            preferred_duties,
            unpreferred_duties,
            day_off_duties,
            duties_by_physician,
            workload_by_physician,
            min_workload,
            max_workload,
            mean_workload,
        }
    }

    /// Difference between the heaviest and lightest workload.
    pub fn workload_range(&self) -> f64 {
        self.max_workload - self.min_workload
    }

    /// Preference score of the roster, weighted as in
    /// [`SearchState::score`](crate::matching::SearchState::score).
    pub fn preference_score(&self) -> i32 {
        PREFERRED_REWARD * self.preferred_duties as i32
            + UNPREFERRED_PENALTY * self.unpreferred_duties as i32
    }
}
