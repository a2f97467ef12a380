//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{courses, grades, users};
use crate::domain::{Course, CourseId, Grade, GradeId, Role, User, UserId};
use crate::error::{Error, Result};

/// Database row for a user (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}

impl UserRow {
    /// Convert into a domain user.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] if the stored role is not recognised.
    pub fn into_user(self) -> Result<User> {
        let role: Role = self.role.parse().map_err(Error::Parse)?;
        Ok(User::new(
            UserId::new(self.id),
            self.username,
            self.password_hash,
            role,
        ))
    }
}

/// Database row for a user (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: String,
}

/// Database row for a course (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CourseRow {
    pub id: i32,
    pub name: String,
    pub schedule: String,
    pub capacity: i32,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: CourseId::new(row.id),
            name: row.name,
            schedule: row.schedule,
            capacity: row.capacity,
        }
    }
}

/// Database row for a course (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = courses)]
pub struct NewCourseRow<'a> {
    pub name: &'a str,
    pub schedule: &'a str,
    pub capacity: i32,
}

/// Database row for a grade (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = grades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GradeRow {
    pub id: i32,
    pub course_id: i32,
    pub student_id: i32,
    pub value: f64,
}

impl From<GradeRow> for Grade {
    fn from(row: GradeRow) -> Self {
        Self {
            id: GradeId::new(row.id),
            course_id: CourseId::new(row.course_id),
            student_id: UserId::new(row.student_id),
            value: row.value,
        }
    }
}

/// Database row for a grade (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = grades)]
pub struct NewGradeRow {
    pub course_id: i32,
    pub student_id: i32,
    pub value: f64,
}
