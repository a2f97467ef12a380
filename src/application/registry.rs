//! Course records and their membership.

use diesel::SqliteConnection;
use tracing::info;

use super::{read, transact};
use crate::adapter::outbound::sqlite::courses;
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::domain::{Course, CourseId, CourseRoster, User};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct CourseRegistry {
    pool: DbPool,
}

impl CourseRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a course with `owner` as its only teacher.
    ///
    /// No role check happens here; callers gate on the acting user.
    ///
    /// # Errors
    /// Returns an error if a statement fails.
    pub fn create(&self, name: &str, schedule: &str, capacity: i32, owner: &User) -> Result<Course> {
        let course = transact(&self.pool, |conn| Self::create_in(conn, name, schedule, capacity, owner))?;
        info!(course = %course.name, id = %course.id, capacity, teacher = %owner.username, "Course created");
        Ok(course)
    }

    /// [`CourseRegistry::create`] inside a caller's transaction.
    pub(crate) fn create_in(
        conn: &mut SqliteConnection,
        name: &str,
        schedule: &str,
        capacity: i32,
        owner: &User,
    ) -> Result<Course> {
        let course = courses::insert(conn, name, schedule, capacity)?;
        courses::add_teacher(conn, course.id, owner.id)?;
        Ok(course)
    }

    /// The oldest course with this name.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no course has the name.
    pub fn find_by_name(&self, name: &str) -> Result<Course> {
        read(&self.pool, |conn| courses::require_by_name(conn, name))
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn list_all(&self) -> Result<Vec<Course>> {
        read(&self.pool, courses::list_all)
    }

    /// The course and its members.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if no course has the name.
    pub fn roster(&self, name: &str) -> Result<CourseRoster> {
        read(&self.pool, |conn| {
            let course = courses::require_by_name(conn, name)?;
            courses::roster(conn, course)
        })
    }

    /// Every course with its members, oldest first.
    ///
    /// # Errors
    /// Returns an error if a query fails.
    pub fn rosters(&self) -> Result<Vec<CourseRoster>> {
        read(&self.pool, |conn| {
            courses::list_all(conn)?
                .into_iter()
                .map(|course| courses::roster(conn, course))
                .collect()
        })
    }

    /// Delete a course with its memberships and grades. Returns the number
    /// of grade rows removed.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the course does not exist.
    pub fn delete(&self, course: CourseId) -> Result<usize> {
        let removed = transact(&self.pool, |conn| Self::delete_in(conn, course))?;
        info!(id = %course, grades_removed = removed, "Course deleted");
        Ok(removed)
    }

    /// [`CourseRegistry::delete`] inside a caller's transaction.
    pub(crate) fn delete_in(conn: &mut SqliteConnection, course: CourseId) -> Result<usize> {
        courses::delete(conn, course)?.ok_or_else(|| Error::not_found("course", course.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{open, MEMORY_URL};
    use crate::adapter::outbound::sqlite::users;
    use crate::domain::Role;

    fn setup() -> (CourseRegistry, User) {
        let pool = open(MEMORY_URL, 1).unwrap();
        let owner = {
            let mut conn = pool.get().unwrap();
            users::insert(&mut conn, "turing", "hash", Role::Teacher, Utc::now()).unwrap()
        };
        (CourseRegistry::new(pool), owner)
    }

    #[test]
    fn create_attaches_owner_as_sole_teacher() {
        let (registry, owner) = setup();
        registry.create("CS101", "MWF 9am", 10, &owner).unwrap();

        let roster = registry.roster("CS101").unwrap();
        assert_eq!(roster.teachers, vec![owner]);
        assert!(roster.students.is_empty());
        assert_eq!(roster.course.capacity, 10);
    }

    #[test]
    fn find_by_name_returns_lowest_id() {
        let (registry, owner) = setup();
        let first = registry.create("CS101", "MWF", 10, &owner).unwrap();
        registry.create("CS101", "TTh", 5, &owner).unwrap();

        assert_eq!(registry.find_by_name("CS101").unwrap(), first);
        assert_eq!(registry.list_all().unwrap().len(), 2);
    }

    #[test]
    fn delete_then_lookup_is_not_found() {
        let (registry, owner) = setup();
        let course = registry.create("CS101", "MWF", 10, &owner).unwrap();

        assert_eq!(registry.delete(course.id).unwrap(), 0);
        assert!(matches!(registry.find_by_name("CS101"), Err(Error::NotFound { .. })));
        assert!(matches!(registry.delete(course.id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn rosters_cover_every_course() {
        let (registry, owner) = setup();
        registry.create("CS101", "MWF", 10, &owner).unwrap();
        registry.create("CS102", "TTh", 5, &owner).unwrap();

        let rosters = registry.rosters().unwrap();
        let names: Vec<_> = rosters.iter().map(|r| r.course.name.as_str()).collect();
        assert_eq!(names, ["CS101", "CS102"]);
        assert!(rosters.iter().all(|r| r.teacher_names() == "turing"));
    }
}
