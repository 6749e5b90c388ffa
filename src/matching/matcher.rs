//! Parallel matcher over one authoritative roster state.

use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{info, warn};

use super::config::MatchConfig;
use super::pool::SolutionPool;
use super::progress::ProgressListener;
use super::state::SearchState;
use super::worker::SearchWorker;
use crate::error::RosterError;
use crate::models::{DutyCalendar, Physician, PhysicianAgenda, Roster, ShiftType};
use crate::validation::validate_input;

/// Builds a duty roster for one month.
///
/// Holds the authoritative state: manual pins are applied to it directly,
/// and a successful [`match_roster`](Self::match_roster) replaces it with
/// the best solution found.
///
/// # Example
/// ```
/// use u_roster::matching::{MatchConfig, Matcher};
/// use u_roster::models::{DutyCalendar, Physician, PhysicianAgenda, ShiftType};
///
/// let calendar = DutyCalendar::new(30)
///     .with_slot(1, ShiftType::Night, 1)
///     .with_slot(15, ShiftType::Night, 1);
/// let physicians = vec![
///     Physician::new("a").with_department("Cardiology").with_experience(10.0),
///     Physician::new("b").with_department("Neurology").with_experience(10.0),
/// ];
/// let agendas = vec![
///     PhysicianAgenda::new("a", 1, vec![1.0, 1.0]),
///     PhysicianAgenda::new("b", 1, vec![1.0, 1.0]),
/// ];
///
/// let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();
/// assert!(matcher.assign("a", ShiftType::Night, 15));
/// assert!(matcher.match_roster(&MatchConfig::default().with_workers(1)).unwrap());
/// assert_eq!(matcher.assignment(ShiftType::Night, 1), vec!["b"]);
/// ```
pub struct Matcher {
    state: SearchState,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl Matcher {
    /// Validates the input and builds the root state.
    ///
    /// # Errors
    /// [`RosterError::InvalidInput`] with every problem found.
    pub fn new(
        calendar: &DutyCalendar,
        physicians: &[Physician],
        agendas: &[PhysicianAgenda],
    ) -> Result<Self, RosterError> {
        validate_input(calendar, physicians, agendas)?;
        Ok(Self::from_state(SearchState::new(calendar, physicians, agendas)))
    }

    /// Wraps an existing state without validation.
    pub fn from_state(state: SearchState) -> Self {
        Self {
            state,
            listener: None,
        }
    }

    /// Sets a listener notified for every collected solution.
    pub fn with_progress(mut self, listener: impl ProgressListener + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Pins a physician to a slot before matching.
    ///
    /// Spacing, day-off, preference, and pairing rules are skipped;
    /// eligibility and quota still apply. The pinned duty is kept through
    /// search and refinement. Returns `false` and leaves the
    /// state unchanged for an unknown physician or slot, or when the pin
    /// makes the roster infeasible.
    pub fn assign(&mut self, physician_id: &str, shift_type: ShiftType, day: u32) -> bool {
        let Some(physician) = self.state.physician_index(physician_id) else {
            warn!(physician_id, "pin rejected: unknown physician");
            return false;
        };
        let Some(slot) = self.state.slot_index(shift_type, day) else {
            warn!(physician_id, %shift_type, day, "pin rejected: no such slot");
            return false;
        };

        let mut pinned = self.state.clone();
        match pinned.pin(slot, physician) {
            Ok(()) => {
                self.state = pinned;
                true
            }
            Err(reason) => {
                warn!(physician_id, %shift_type, day, %reason, "pin rejected");
                false
            }
        }
    }

    /// Runs the parallel search.
    ///
    /// Returns `Ok(true)` and adopts the highest-scoring solution when at
    /// least one was found; `Ok(false)` leaves the state as it was.
    ///
    /// # Errors
    /// [`RosterError::InvalidConfig`] if `config` fails validation.
    #[tracing::instrument(level = "debug", skip(self, config), fields(workers = tracing::field::Empty))]
    pub fn match_roster(&mut self, config: &MatchConfig) -> Result<bool, RosterError> {
        config.validate()?;

        let limits = config.limits(self.state.total_capacity());
        let workers = config.resolved_workers();
        let base_seed = config.seed.unwrap_or_else(rand::random);
        tracing::Span::current().record("workers", workers);

        let pool = SolutionPool::new();
        let initial = &self.state;
        let listener = self.listener.as_deref();

        thread::scope(|scope| {
            for id in 0..workers {
                let rng = SmallRng::seed_from_u64(base_seed.wrapping_add(id as u64));
                let mut worker = SearchWorker::new(id, initial, &pool, limits, rng);
                if let Some(listener) = listener {
                    worker = worker.with_listener(listener);
                }
                scope.spawn(move || worker.run());
            }
        });

        let collected = pool.len();
        match pool.into_best() {
            Some(best) => {
                info!(collected, score = best.score(), "best roster selected");
                self.state = best;
                Ok(true)
            }
            None => {
                warn!("no feasible roster found; increase duty quotas and retry");
                Ok(false)
            }
        }
    }

    /// Physician IDs assigned to (`shift_type`, `day`).
    pub fn assignment(&self, shift_type: ShiftType, day: u32) -> Vec<&str> {
        self.state.assigned(shift_type, day)
    }

    /// Preference score of the current state.
    pub fn score(&self) -> i32 {
        self.state.score()
    }

    /// Current assignment as a roster.
    pub fn roster(&self) -> Roster {
        self.state.to_roster()
    }

    /// Current search state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::progress::SolutionFound;
    use crate::matching::testing::doctor;
    use crate::validation::ValidationErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DOUBLED_NIGHTS: [u32; 4] = [6, 13, 20, 27];

    /// Thirty nights, four of them doubled: 34 duties for 15 physicians
    /// in 5 departments.
    fn month() -> (DutyCalendar, Vec<Physician>, Vec<PhysicianAgenda>) {
        let mut calendar = DutyCalendar::new(30);
        for day in 1..=30 {
            let capacity = if DOUBLED_NIGHTS.contains(&day) { 2 } else { 1 };
            calendar = calendar.with_slot(day, ShiftType::Night, capacity);
        }
        assert_eq!(calendar.required_duties(), 34);

        let departments = ["Cardiology", "Nephrology", "Neurology", "Surgery", "Pediatrics"];
        let physicians: Vec<Physician> = (0..15)
            .map(|i| doctor(&format!("dr{i:02}"), departments[i % 5], 5.0 + i as f64))
            .collect();

        let slots = calendar.slot_count();
        let agendas = physicians
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let quota = if i < 4 { 3 } else { 2 };
                let scores = (0..slots).map(|j| 1.0 + ((i + j) % 3) as f64 * 0.1).collect();
                let mut agenda = PhysicianAgenda::new(p.id.clone(), quota, scores)
                    .with_preferred_day(((i * 7) % 30 + 1) as u32);
                if i % 4 == 0 {
                    agenda = agenda.with_unpreferred_day(((i * 5) % 30 + 1) as u32);
                }
                agenda
            })
            .collect();
        (calendar, physicians, agendas)
    }

    fn quick_config() -> MatchConfig {
        MatchConfig::default()
            .with_recursion_max(2000)
            .with_trial_max(200)
            .with_solution_max(3)
            .with_workers(2)
            .with_seed(17)
    }

    #[test]
    fn test_month_roster_satisfies_rules() {
        let (calendar, physicians, agendas) = month();
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();
        assert!(matcher.match_roster(&quick_config()).unwrap());

        let roster = matcher.roster();
        assert!(roster.is_complete(&calendar));
        assert_eq!(roster.score, matcher.score());

        for (p, agenda) in physicians.iter().zip(&agendas) {
            let duties = roster.duties_of(&p.id);
            assert_eq!(duties.len() as u32, agenda.quota, "{} quota", p.id);

            let days: Vec<u32> = duties.iter().map(|e| e.day).collect();
            for (i, a) in days.iter().enumerate() {
                for b in &days[i + 1..] {
                    assert!(a.abs_diff(*b) >= 5, "{} works days {a} and {b}", p.id);
                }
            }
            let unpreferred = duties
                .iter()
                .filter(|e| agenda.is_unpreferred(e.day, e.shift_type))
                .count();
            assert!(unpreferred <= 1);
        }

        for day in DOUBLED_NIGHTS {
            let ids = matcher.assignment(ShiftType::Night, day);
            assert_eq!(ids.len(), 2);
            let dept = |id: &str| {
                physicians
                    .iter()
                    .find(|p| p.id == id)
                    .map(|p| p.department.clone())
                    .unwrap()
            };
            assert_ne!(dept(ids[0]), dept(ids[1]), "night {day} pairs one department");
        }
    }

    #[test]
    fn test_invalid_input_rejected() {
        let calendar = DutyCalendar::new(30).with_slot(3, ShiftType::Night, 1);
        let physicians = vec![doctor("A", "X", 10.0)];
        let agendas = vec![PhysicianAgenda::new("A", 0, vec![1.0])];
        let err = Matcher::new(&calendar, &physicians, &agendas).err().unwrap();
        match err {
            RosterError::InvalidInput(errors) => {
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::QuotaShortfall));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (calendar, physicians, agendas) = month();
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();
        let config = quick_config().with_threshold_max(0);
        assert!(matches!(
            matcher.match_roster(&config),
            Err(RosterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_pin_rejections_leave_state() {
        let calendar = DutyCalendar::new(30)
            .with_slot(1, ShiftType::Night, 1)
            .with_slot(15, ShiftType::Night, 1);
        let physicians = vec![doctor("A", "X", 10.0), doctor("B", "Y", 10.0)];
        let agendas = vec![
            PhysicianAgenda::new("A", 1, vec![1.0, 1.0]),
            PhysicianAgenda::new("B", 1, vec![1.0, 1.0]),
        ];
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();

        assert!(!matcher.assign("nobody", ShiftType::Night, 1));
        assert!(!matcher.assign("A", ShiftType::Day, 1));

        assert!(matcher.assign("A", ShiftType::Night, 1));
        let before = matcher.roster();
        // A has no quota left
        assert!(!matcher.assign("A", ShiftType::Night, 15));
        assert_eq!(matcher.roster().entries, before.entries);
        assert_eq!(matcher.state().remaining_quota(0), 0);
        assert_eq!(matcher.state().remaining_quota(1), 1);
    }

    #[test]
    fn test_pin_starving_slot_rejected() {
        // B cannot work N/1, so A must stay available for it
        let calendar = DutyCalendar::new(30)
            .with_slot(1, ShiftType::Night, 1)
            .with_slot(15, ShiftType::Night, 1);
        let physicians = vec![doctor("A", "X", 10.0), doctor("B", "Y", 10.0)];
        let agendas = vec![
            PhysicianAgenda::new("A", 1, vec![1.0, 1.0]),
            PhysicianAgenda::new("B", 1, vec![0.0, 1.0]),
        ];
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();
        assert!(!matcher.assign("A", ShiftType::Night, 15));
        assert!(matcher.assignment(ShiftType::Night, 15).is_empty());
        assert_eq!(matcher.state().open_count(), 2);
    }

    #[test]
    fn test_pins_survive_matching() {
        let (calendar, physicians, agendas) = month();
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();
        assert!(matcher.assign("dr00", ShiftType::Night, 6));
        assert!(matcher.assign("dr01", ShiftType::Night, 6));
        assert!(matcher.match_roster(&quick_config()).unwrap());

        let mut night6 = matcher.assignment(ShiftType::Night, 6);
        night6.sort_unstable();
        assert_eq!(night6, vec!["dr00", "dr01"]);
        let slot = matcher.state().slot_index(ShiftType::Night, 6).unwrap();
        assert!(matcher.state().is_pinned(slot, 0));
        assert!(matcher.state().is_pinned(slot, 1));
    }

    #[test]
    fn test_no_solution_keeps_state() {
        // Only A can work either night, and the nights are two days apart
        let calendar = DutyCalendar::new(30)
            .with_slot(10, ShiftType::Night, 1)
            .with_slot(12, ShiftType::Night, 1);
        let physicians = vec![doctor("A", "X", 10.0), doctor("B", "Y", 10.0)];
        let agendas = vec![
            PhysicianAgenda::new("A", 2, vec![1.0, 1.0]),
            PhysicianAgenda::new("B", 0, vec![1.0, 1.0]),
        ];
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas).unwrap();
        let config = MatchConfig::default()
            .with_trial_max(5)
            .with_workers(2)
            .with_seed(1);
        assert!(!matcher.match_roster(&config).unwrap());
        assert_eq!(matcher.state().open_count(), 2);
        assert_eq!(matcher.roster().assignment_count(), 0);
    }

    #[test]
    fn test_progress_listener_called() {
        let calendar = DutyCalendar::new(30)
            .with_slot(1, ShiftType::Night, 1)
            .with_slot(15, ShiftType::Night, 1);
        let physicians = vec![doctor("A", "X", 10.0), doctor("B", "Y", 10.0)];
        let agendas = vec![
            PhysicianAgenda::new("A", 1, vec![1.0, 1.0]),
            PhysicianAgenda::new("B", 1, vec![1.0, 1.0]),
        ];
        let events = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&events);
        let mut matcher = Matcher::new(&calendar, &physicians, &agendas)
            .unwrap()
            .with_progress(move |_: &SolutionFound| {
                counter.fetch_add(1, Ordering::Relaxed);
            });

        let config = MatchConfig::default()
            .with_solution_max(4)
            .with_workers(1)
            .with_seed(3);
        assert!(matcher.match_roster(&config).unwrap());
        assert_eq!(events.load(Ordering::Relaxed), 4);
        assert!(matcher.state().is_fulfilled());
    }
}
