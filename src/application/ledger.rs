//! Grade records, one per (course, student) pair.

use serde::Serialize;
use tracing::{info, warn};

use super::{read, transact};
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::{courses, grades, users};
use crate::domain::grade::parse_grade;
use crate::domain::{Course, CourseId, SessionState, UserId};
use crate::error::{Error, Result};

/// One row of a grade sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSheetEntry {
    pub student: String,
    pub grade: f64,
}

/// A course's students and their grades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSheet {
    pub course: Course,
    pub teachers: Vec<String>,
    pub entries: Vec<GradeSheetEntry>,
}

#[derive(Clone)]
pub struct GradeLedger {
    pool: DbPool,
}

impl GradeLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The stored grade, creating it at 0.0 if the pair has none.
    ///
    /// # Errors
    /// Returns an error if a statement fails.
    pub fn get_or_create(&self, student: UserId, course: CourseId) -> Result<f64> {
        let grade = transact(&self.pool, |conn| grades::get_or_create(conn, course, student))?;
        Ok(grade.value)
    }

    /// Overwrite an existing grade.
    ///
    /// # Errors
    /// Returns [`Error::MissingGradeRecord`] if the pair has no grade.
    pub fn set(&self, student: UserId, course: CourseId, value: f64) -> Result<()> {
        transact(&self.pool, |conn| grades::set(conn, course, student, value))
    }

    /// Remove a grade if present. Returns whether a row was removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn delete(&self, student: UserId, course: CourseId) -> Result<bool> {
        transact(&self.pool, |conn| grades::delete(conn, course, student))
    }

    /// Remove a grade that must exist.
    ///
    /// # Errors
    /// Returns [`Error::MissingGradeRecord`] if the pair has no grade.
    pub fn delete_strict(&self, student: UserId, course: CourseId) -> Result<()> {
        transact(&self.pool, |conn| grades::delete_existing(conn, course, student))
    }

    /// The grade sheet for a course. Missing grades are created at 0.0.
    ///
    /// # Errors
    /// Returns [`Error::Unauthenticated`] for anonymous callers or
    /// [`Error::NotFound`] for an unknown course.
    pub fn sheet(&self, session: &SessionState, course_name: &str) -> Result<GradeSheet> {
        session.actor()?;
        transact(&self.pool, |conn| {
            let course = courses::require_by_name(conn, course_name)?;
            let teachers = courses::teachers(conn, course.id)?
                .into_iter()
                .map(|teacher| teacher.username)
                .collect();
            let students = courses::students(conn, course.id)?;

            let mut entries = Vec::with_capacity(students.len());
            for student in students {
                let grade = grades::get_or_create(conn, course.id, student.id)?;
                entries.push(GradeSheetEntry {
                    student: student.username,
                    grade: grade.value,
                });
            }

            Ok(GradeSheet {
                course,
                teachers,
                entries,
            })
        })
    }

    /// Record a grade submitted as form text. Teachers only.
    ///
    /// # Errors
    /// Returns [`Error::Authorization`] for non-teachers, a validation error
    /// for a blank or non-numeric grade, [`Error::NotFound`] for an unknown
    /// course or student, and [`Error::MissingGradeRecord`] when the student
    /// has no grade in the course.
    pub fn assign(
        &self,
        session: &SessionState,
        course_name: &str,
        student_name: &str,
        raw_grade: &str,
    ) -> Result<()> {
        let teacher = session.actor()?.as_teacher("assign grades")?;
        let value = parse_grade(raw_grade)?;

        let result = transact(&self.pool, |conn| {
            let course = courses::require_by_name(conn, course_name)?;
            let student = users::find_by_username(conn, student_name)?
                .ok_or_else(|| Error::not_found("user", student_name))?;
            grades::set(conn, course.id, student.id, value)
        });

        match &result {
            Ok(()) => info!(
                teacher = %teacher.username,
                course = course_name,
                student = student_name,
                grade = value,
                "Grade assigned"
            ),
            Err(e) => warn!(
                teacher = %teacher.username,
                course = course_name,
                student = student_name,
                error = %e,
                "Grade assignment rejected"
            ),
        }
        result
    }

    /// Read a grade without creating it.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn peek(&self, student: UserId, course: CourseId) -> Result<Option<f64>> {
        read(&self.pool, |conn| {
            Ok(grades::find(conn, course, student)?.map(|grade| grade.value))
        })
    }
}
