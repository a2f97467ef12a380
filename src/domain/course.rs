//! Courses and their membership.

use serde::Serialize;

use super::error::{Field, ValidationError};
use super::id::{CourseId, UserId};
use super::role::Role;
use super::user::User;

/// Seats given to a course created without an explicit capacity.
pub const DEFAULT_CAPACITY: i32 = 10;

/// Parse a submitted capacity. Blank or absent means [`DEFAULT_CAPACITY`].
///
/// # Errors
/// Returns [`ValidationError::InvalidValue`] if the text is not an integer.
pub fn parse_capacity(raw: Option<&str>) -> Result<i32, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_CAPACITY),
        Some(raw) => raw
            .parse()
            .map_err(|_| ValidationError::invalid(Field::Capacity, "Capacity must be a whole number")),
    }
}

/// A course record.
///
/// `capacity` is the number of remaining seats. It is not floored at zero:
/// enrolling into a full course drives it negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub schedule: String,
    pub capacity: i32,
}

/// How a user belongs to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Membership {
    Teaching,
    Attending,
}

/// Per (course, user) enrollment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnrollmentState {
    NotEnrolled,
    Enrolled(Membership),
}

impl EnrollmentState {
    #[must_use]
    pub const fn is_enrolled(self) -> bool {
        matches!(self, Self::Enrolled(_))
    }
}

/// A course together with its teachers and students.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRoster {
    pub course: Course,
    pub teachers: Vec<User>,
    pub students: Vec<User>,
}

impl CourseRoster {
    #[must_use]
    pub fn has_student(&self, id: UserId) -> bool {
        self.students.iter().any(|student| student.id == id)
    }

    /// Comma-joined teacher usernames, as shown in the admin course list.
    #[must_use]
    pub fn teacher_names(&self) -> String {
        join_usernames(&self.teachers)
    }

    /// Comma-joined student usernames, as shown in the admin course list.
    #[must_use]
    pub fn student_names(&self) -> String {
        join_usernames(&self.students)
    }
}

pub(crate) fn join_usernames(users: &[User]) -> String {
    users
        .iter()
        .map(|user| user.username.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-joined course names for a user's row in the admin user list.
///
/// Teachers list the courses they teach; every other role lists the
/// courses they attend.
#[must_use]
pub fn course_names_for(role: Role, taught: &[Course], enrolled: &[Course]) -> String {
    let courses = match role {
        Role::Teacher => taught,
        Role::Student | Role::Admin => enrolled,
    };
    courses
        .iter()
        .map(|course| course.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
