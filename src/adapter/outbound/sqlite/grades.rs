//! SQLite grade ledger.
//!
//! At most one row per (course, student); the table's unique constraint
//! backs that up.

use diesel::prelude::*;
use diesel::SqliteConnection;

use super::database::model::{GradeRow, NewGradeRow};
use super::database::schema::grades;
use crate::domain::{CourseId, Grade, GradeId, UserId, INITIAL_GRADE};
use crate::error::{Error, Result};

fn missing(course: CourseId, student: UserId) -> Error {
    Error::MissingGradeRecord {
        course: course.to_string(),
        student: student.to_string(),
    }
}

/// Insert a grade row.
///
/// # Errors
/// Returns [`Error::DuplicateEntity`] if the pair already has a grade.
pub fn insert(
    conn: &mut SqliteConnection,
    course: CourseId,
    student: UserId,
    value: f64,
) -> Result<Grade> {
    if find(conn, course, student)?.is_some() {
        return Err(Error::duplicate("grade", format!("{course}/{student}")));
    }

    diesel::insert_into(grades::table)
        .values(&NewGradeRow {
            course_id: course.get(),
            student_id: student.get(),
            value,
        })
        .execute(conn)?;

    find(conn, course, student)?
        .ok_or_else(|| Error::Internal(format!("inserted grade {course}/{student} not found")))
}

/// The grade for a pair, if any.
///
/// # Errors
/// Returns an error if the query fails.
pub fn find(conn: &mut SqliteConnection, course: CourseId, student: UserId) -> Result<Option<Grade>> {
    let row: Option<GradeRow> = grades::table
        .filter(grades::course_id.eq(course.get()))
        .filter(grades::student_id.eq(student.get()))
        .select(GradeRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Grade::from))
}

/// Look a grade up by id.
///
/// # Errors
/// Returns an error if the query fails.
pub fn find_by_id(conn: &mut SqliteConnection, id: GradeId) -> Result<Option<Grade>> {
    let row: Option<GradeRow> = grades::table
        .find(id.get())
        .select(GradeRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Grade::from))
}

/// The existing grade for a pair, or a new one at [`INITIAL_GRADE`].
///
/// # Errors
/// Returns an error if a statement fails.
pub fn get_or_create(conn: &mut SqliteConnection, course: CourseId, student: UserId) -> Result<Grade> {
    match find(conn, course, student)? {
        Some(grade) => Ok(grade),
        None => insert(conn, course, student, INITIAL_GRADE),
    }
}

/// Overwrite the value of an existing grade.
///
/// # Errors
/// Returns [`Error::MissingGradeRecord`] if the pair has no grade.
pub fn set(conn: &mut SqliteConnection, course: CourseId, student: UserId, value: f64) -> Result<()> {
    let updated = diesel::update(
        grades::table
            .filter(grades::course_id.eq(course.get()))
            .filter(grades::student_id.eq(student.get())),
    )
    .set(grades::value.eq(value))
    .execute(conn)?;

    if updated == 0 {
        return Err(missing(course, student));
    }
    Ok(())
}

/// Delete the grade for a pair. Returns false if there was none.
///
/// # Errors
/// Returns an error if the delete fails.
pub fn delete(conn: &mut SqliteConnection, course: CourseId, student: UserId) -> Result<bool> {
    let removed = diesel::delete(
        grades::table
            .filter(grades::course_id.eq(course.get()))
            .filter(grades::student_id.eq(student.get())),
    )
    .execute(conn)?;
    Ok(removed > 0)
}

/// Delete the grade for a pair, which must exist.
///
/// # Errors
/// Returns [`Error::MissingGradeRecord`] if the pair has no grade.
pub fn delete_existing(conn: &mut SqliteConnection, course: CourseId, student: UserId) -> Result<()> {
    if delete(conn, course, student)? {
        Ok(())
    } else {
        Err(missing(course, student))
    }
}

/// Overwrite a grade by id. Returns false if no row matched.
///
/// # Errors
/// Returns an error if the update fails.
pub fn update_by_id(conn: &mut SqliteConnection, id: GradeId, value: f64) -> Result<bool> {
    let updated = diesel::update(grades::table.find(id.get()))
        .set(grades::value.eq(value))
        .execute(conn)?;
    Ok(updated > 0)
}

/// Delete a grade by id. Returns false if no row matched.
///
/// # Errors
/// Returns an error if the delete fails.
pub fn delete_by_id(conn: &mut SqliteConnection, id: GradeId) -> Result<bool> {
    let removed = diesel::delete(grades::table.find(id.get())).execute(conn)?;
    Ok(removed > 0)
}

/// All grades in id order.
///
/// # Errors
/// Returns an error if the query fails.
pub fn list_all(conn: &mut SqliteConnection) -> Result<Vec<Grade>> {
    let rows: Vec<GradeRow> = grades::table
        .order(grades::id.asc())
        .select(GradeRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Grade::from).collect())
}
