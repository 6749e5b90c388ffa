//! Input validation for rostering problems.
//!
//! Checks structural integrity of the calendar, physicians, and agendas
//! before a matcher is built. Detects:
//! - Duplicate physician IDs and duplicate slots
//! - Zero-capacity slots and days outside the month
//! - Agendas without a physician, physicians without an agenda
//! - Score vectors that do not match the calendar
//! - A total quota too small to ever fill the calendar

use crate::models::{DutyCalendar, Physician, PhysicianAgenda};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same identity.
    DuplicateId,
    /// A slot requires zero physicians.
    ZeroCapacity,
    /// A slot falls outside `1..=days`.
    DayOutOfRange,
    /// An agenda references a physician that doesn't exist.
    UnknownPhysician,
    /// A physician has no agenda.
    MissingAgenda,
    /// A score vector length differs from the slot count.
    ScoreShapeMismatch,
    /// A score is NaN or infinite.
    NonFiniteScore,
    /// Sum of quotas is smaller than the number of duties.
    QuotaShortfall,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a rostering problem.
///
/// Checks:
/// 1. No duplicate physician IDs
/// 2. No duplicate (type, day) slots
/// 3. Every slot has capacity >= 1 and a day within the month
/// 4. Every agenda belongs to a known physician, at most once
/// 5. Every physician has an agenda
/// 6. Every score vector has one finite entry per slot
/// 7. Total quota covers the required duties
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    calendar: &DutyCalendar,
    physicians: &[Physician],
    agendas: &[PhysicianAgenda],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut physician_ids = HashSet::new();
    for p in physicians {
        if !physician_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate physician ID: {}", p.id),
            ));
        }
    }

    let mut slot_keys = HashSet::new();
    for slot in &calendar.slots {
        if !slot_keys.insert((slot.shift_type, slot.day)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate slot: {}/{}", slot.shift_type, slot.day),
            ));
        }
        if slot.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Slot {}/{} has zero capacity", slot.shift_type, slot.day),
            ));
        }
        if slot.day == 0 || slot.day > calendar.days {
            errors.push(ValidationError::new(
                ValidationErrorKind::DayOutOfRange,
                format!(
                    "Slot {}/{} is outside a {}-day month",
                    slot.shift_type, slot.day, calendar.days
                ),
            ));
        }
    }

    let mut covered = HashSet::new();
    for agenda in agendas {
        if !physician_ids.contains(agenda.physician_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownPhysician,
                format!("Agenda references unknown physician '{}'", agenda.physician_id),
            ));
        } else if !covered.insert(agenda.physician_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate agenda for physician '{}'", agenda.physician_id),
            ));
        }

        if agenda.scores.len() != calendar.slot_count() {
            errors.push(ValidationError::new(
                ValidationErrorKind::ScoreShapeMismatch,
                format!(
                    "Agenda of '{}' has {} scores for {} slots",
                    agenda.physician_id,
                    agenda.scores.len(),
                    calendar.slot_count()
                ),
            ));
        }
        if agenda.scores.iter().any(|s| !s.is_finite()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonFiniteScore,
                format!("Agenda of '{}' contains a non-finite score", agenda.physician_id),
            ));
        }
    }

    for p in physicians {
        if !covered.contains(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingAgenda,
                format!("Physician '{}' has no agenda", p.id),
            ));
        }
    }

    let total_quota: u64 = agendas.iter().map(|a| u64::from(a.quota)).sum();
    let required = u64::from(calendar.required_duties());
    if total_quota < required {
        errors.push(ValidationError::new(
            ValidationErrorKind::QuotaShortfall,
            format!("Total quota {total_quota} is smaller than {required} required duties"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
