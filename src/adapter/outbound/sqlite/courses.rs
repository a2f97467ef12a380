//! SQLite course registry.
//!
//! Rows in `courses` plus the `course_teachers` and `course_students`
//! membership tables. Course names are not unique; name lookups return the
//! oldest match.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::SqliteConnection;

use super::database::model::{CourseRow, NewCourseRow};
use super::database::schema::{course_students, course_teachers, courses, grades};
use super::users;
use crate::domain::{
    Course, CourseId, CourseRoster, EnrollmentState, Field, Membership, User, UserId, ValidationError,
};
use crate::error::{Error, Result};

/// Insert a course with no members.
///
/// # Errors
/// Returns an error if the insert fails.
pub fn insert(
    conn: &mut SqliteConnection,
    name: &str,
    schedule: &str,
    capacity: i32,
) -> Result<Course> {
    diesel::insert_into(courses::table)
        .values(&NewCourseRow {
            name,
            schedule,
            capacity,
        })
        .execute(conn)?;

    // Names are not unique, so read back the newest row instead.
    let row: CourseRow = courses::table
        .order(courses::id.desc())
        .select(CourseRow::as_select())
        .first(conn)?;

    Ok(row.into())
}

/// Look a course up by id.
///
/// # Errors
/// Returns an error if the query fails.
pub fn find_by_id(conn: &mut SqliteConnection, id: CourseId) -> Result<Option<Course>> {
    let row: Option<CourseRow> = courses::table
        .find(id.get())
        .select(CourseRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Course::from))
}

/// The oldest course with this exact name.
///
/// # Errors
/// Returns an error if the query fails.
pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<Course>> {
    let row: Option<CourseRow> = courses::table
        .filter(courses::name.eq(name))
        .order(courses::id.asc())
        .select(CourseRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(Course::from))
}

/// Like [`find_by_name`] but a miss is an error.
///
/// # Errors
/// Returns [`Error::NotFound`] if no course has the name.
pub fn require_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Course> {
    find_by_name(conn, name)?.ok_or_else(|| Error::not_found("course", name))
}

/// All courses in creation order.
///
/// # Errors
/// Returns an error if the query fails.
pub fn list_all(conn: &mut SqliteConnection) -> Result<Vec<Course>> {
    let rows: Vec<CourseRow> = courses::table
        .order(courses::id.asc())
        .select(CourseRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Course::from).collect())
}

fn list_by_ids(conn: &mut SqliteConnection, ids: Vec<i32>) -> Result<Vec<Course>> {
    let rows: Vec<CourseRow> = courses::table
        .filter(courses::id.eq_any(ids))
        .order(courses::id.asc())
        .select(CourseRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(Course::from).collect())
}

/// Courses the user teaches.
///
/// # Errors
/// Returns an error if the query fails.
pub fn taught_by(conn: &mut SqliteConnection, user: UserId) -> Result<Vec<Course>> {
    let ids: Vec<i32> = course_teachers::table
        .filter(course_teachers::teacher_id.eq(user.get()))
        .select(course_teachers::course_id)
        .load(conn)?;
    list_by_ids(conn, ids)
}

/// Courses the user attends as a student.
///
/// # Errors
/// Returns an error if the query fails.
pub fn enrolled_by(conn: &mut SqliteConnection, user: UserId) -> Result<Vec<Course>> {
    let ids: Vec<i32> = course_students::table
        .filter(course_students::student_id.eq(user.get()))
        .select(course_students::course_id)
        .load(conn)?;
    list_by_ids(conn, ids)
}

/// Teachers of a course, in id order.
///
/// # Errors
/// Returns an error if the query fails.
pub fn teachers(conn: &mut SqliteConnection, course: CourseId) -> Result<Vec<User>> {
    let ids: Vec<i32> = course_teachers::table
        .filter(course_teachers::course_id.eq(course.get()))
        .select(course_teachers::teacher_id)
        .load(conn)?;
    users::list_by_ids(conn, &ids)
}

/// Students of a course, in id order.
///
/// # Errors
/// Returns an error if the query fails.
pub fn students(conn: &mut SqliteConnection, course: CourseId) -> Result<Vec<User>> {
    let ids: Vec<i32> = course_students::table
        .filter(course_students::course_id.eq(course.get()))
        .select(course_students::student_id)
        .load(conn)?;
    users::list_by_ids(conn, &ids)
}

/// A course with its teachers and students.
///
/// # Errors
/// Returns an error if a query fails.
pub fn roster(conn: &mut SqliteConnection, course: Course) -> Result<CourseRoster> {
    let teachers = teachers(conn, course.id)?;
    let students = students(conn, course.id)?;
    Ok(CourseRoster {
        course,
        teachers,
        students,
    })
}

fn is_teacher(conn: &mut SqliteConnection, course: CourseId, user: UserId) -> Result<bool> {
    let found: bool = diesel::select(exists(
        course_teachers::table
            .filter(course_teachers::course_id.eq(course.get()))
            .filter(course_teachers::teacher_id.eq(user.get())),
    ))
    .get_result(conn)?;
    Ok(found)
}

fn is_student(conn: &mut SqliteConnection, course: CourseId, user: UserId) -> Result<bool> {
    let found: bool = diesel::select(exists(
        course_students::table
            .filter(course_students::course_id.eq(course.get()))
            .filter(course_students::student_id.eq(user.get())),
    ))
    .get_result(conn)?;
    Ok(found)
}

/// Whether `user` belongs to `course` in the `as_` membership table.
///
/// Teaching and attending are tracked separately, so a user listed in both
/// tables is enrolled under either.
///
/// # Errors
/// Returns an error if the query fails.
pub fn membership(
    conn: &mut SqliteConnection,
    course: CourseId,
    user: UserId,
    as_: Membership,
) -> Result<EnrollmentState> {
    let found = match as_ {
        Membership::Teaching => is_teacher(conn, course, user)?,
        Membership::Attending => is_student(conn, course, user)?,
    };
    Ok(if found {
        EnrollmentState::Enrolled(as_)
    } else {
        EnrollmentState::NotEnrolled
    })
}

/// Add a teacher. Returns false if they already teach the course.
///
/// # Errors
/// Returns an error if the insert fails.
pub fn add_teacher(conn: &mut SqliteConnection, course: CourseId, user: UserId) -> Result<bool> {
    let inserted = diesel::insert_or_ignore_into(course_teachers::table)
        .values((
            course_teachers::course_id.eq(course.get()),
            course_teachers::teacher_id.eq(user.get()),
        ))
        .execute(conn)?;
    Ok(inserted > 0)
}

/// Add a student. Returns false if they already attend the course.
///
/// # Errors
/// Returns an error if the insert fails.
pub fn add_student(conn: &mut SqliteConnection, course: CourseId, user: UserId) -> Result<bool> {
    let inserted = diesel::insert_or_ignore_into(course_students::table)
        .values((
            course_students::course_id.eq(course.get()),
            course_students::student_id.eq(user.get()),
        ))
        .execute(conn)?;
    Ok(inserted > 0)
}

/// Remove a student. Returns false if they were not attending.
///
/// # Errors
/// Returns an error if the delete fails.
pub fn remove_student(conn: &mut SqliteConnection, course: CourseId, user: UserId) -> Result<bool> {
    let removed = diesel::delete(
        course_students::table
            .filter(course_students::course_id.eq(course.get()))
            .filter(course_students::student_id.eq(user.get())),
    )
    .execute(conn)?;
    Ok(removed > 0)
}

/// Replace the teacher set.
///
/// # Errors
/// Returns an error if a statement fails.
pub fn set_teachers(conn: &mut SqliteConnection, course: CourseId, teachers: &[User]) -> Result<()> {
    diesel::delete(course_teachers::table.filter(course_teachers::course_id.eq(course.get())))
        .execute(conn)?;
    for teacher in teachers {
        add_teacher(conn, course, teacher.id)?;
    }
    Ok(())
}

/// Replace the student set. Grade rows are left untouched.
///
/// # Errors
/// Returns an error if a statement fails.
pub fn set_students(conn: &mut SqliteConnection, course: CourseId, students: &[User]) -> Result<()> {
    diesel::delete(course_students::table.filter(course_students::course_id.eq(course.get())))
        .execute(conn)?;
    for student in students {
        add_student(conn, course, student.id)?;
    }
    Ok(())
}

/// Add `delta` to the remaining capacity. No floor is applied, but the
/// result must stay within `i32`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the course does not exist and a
/// capacity validation error if the sum overflows.
pub fn adjust_capacity(conn: &mut SqliteConnection, course: CourseId, delta: i32) -> Result<i32> {
    let current: i32 = courses::table
        .find(course.get())
        .select(courses::capacity)
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::not_found("course", course.to_string()))?;
    let capacity = current
        .checked_add(delta)
        .ok_or_else(|| ValidationError::invalid(Field::Capacity, "Capacity out of range"))?;

    diesel::update(courses::table.find(course.get()))
        .set(courses::capacity.eq(capacity))
        .execute(conn)?;
    Ok(capacity)
}

/// Overwrite the remaining capacity.
///
/// # Errors
/// Returns [`Error::NotFound`] if the course does not exist.
pub fn update_capacity(conn: &mut SqliteConnection, course: CourseId, capacity: i32) -> Result<()> {
    let updated = diesel::update(courses::table.find(course.get()))
        .set(courses::capacity.eq(capacity))
        .execute(conn)?;
    if updated == 0 {
        return Err(Error::not_found("course", course.to_string()));
    }
    Ok(())
}

/// Overwrite a course's scalar columns.
///
/// # Errors
/// Returns [`Error::NotFound`] if the course does not exist.
pub fn update(
    conn: &mut SqliteConnection,
    course: CourseId,
    name: &str,
    schedule: &str,
    capacity: i32,
) -> Result<()> {
    let updated = diesel::update(courses::table.find(course.get()))
        .set((
            courses::name.eq(name),
            courses::schedule.eq(schedule),
            courses::capacity.eq(capacity),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(Error::not_found("course", course.to_string()));
    }
    Ok(())
}

/// Delete a course, its memberships and all of its grades.
///
/// Returns the number of grade rows removed, or `None` if the course did
/// not exist.
///
/// # Errors
/// Returns an error if a delete fails.
pub fn delete(conn: &mut SqliteConnection, course: CourseId) -> Result<Option<usize>> {
    let grades_removed =
        diesel::delete(grades::table.filter(grades::course_id.eq(course.get()))).execute(conn)?;
    diesel::delete(course_students::table.filter(course_students::course_id.eq(course.get())))
        .execute(conn)?;
    diesel::delete(course_teachers::table.filter(course_teachers::course_id.eq(course.get())))
        .execute(conn)?;
    let deleted = diesel::delete(courses::table.find(course.get())).execute(conn)?;

    Ok((deleted > 0).then_some(grades_removed))
}
