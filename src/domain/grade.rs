//! Grade ledger entries.

use serde::Serialize;

use super::error::{Field, ValidationError};
use super::id::{CourseId, GradeId, UserId};

/// Value given to a freshly created grade record.
pub const INITIAL_GRADE: f64 = 0.0;

/// One grade per (course, student) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub id: GradeId,
    pub course_id: CourseId,
    pub student_id: UserId,
    pub value: f64,
}

/// Parse a grade submitted as form text.
///
/// # Errors
/// Returns a [`ValidationError`] if the text is blank or not a finite number.
pub fn parse_grade(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::missing([Field::Grade]));
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::invalid(Field::Grade, "Grade must be a number")),
    }
}
