//! Join and leave transitions across courses, memberships and grades.
//!
//! Per (course, user) pair the state is [`EnrollmentState`](crate::domain::EnrollmentState). Each
//! transition below is one immediate transaction:
//!
//! | actor   | enroll                         | unenroll (self)            |
//! |---------|--------------------------------|----------------------------|
//! | Teacher | join teacher set               | delete the whole course    |
//! | other   | capacity -1, join, grade 0.0   | capacity +1, leave, drop grade if any |
//!
//! A teacher may also remove a named student ([`EnrollmentService::unenroll_user`]),
//! which insists that the student's grade exists.

use serde::Serialize;
use tracing::{info, warn};

use super::{read, transact, CourseRegistry};
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::{courses, grades, users};
use crate::domain::course::parse_capacity;
use crate::domain::error::require;
use crate::domain::{
    Actor, Course, Field, Membership, SessionState, User, ValidationError, INITIAL_GRADE,
};
use crate::error::{Error, Result};

/// Course creation form, as submitted.
#[derive(Debug, Clone, Default)]
pub struct NewCourse {
    pub name: String,
    pub time: String,
    /// Blank or absent means [`DEFAULT_CAPACITY`](crate::domain::DEFAULT_CAPACITY).
    pub capacity: Option<String>,
}

impl NewCourse {
    pub fn new(name: impl Into<String>, time: impl Into<String>, capacity: Option<i32>) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
            capacity: capacity.map(|c| c.to_string()),
        }
    }

    fn capacity(&self) -> std::result::Result<i32, ValidationError> {
        parse_capacity(self.capacity.as_deref())
    }
}

/// What a self-service unenroll did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Unenrollment {
    /// A teacher left, taking the course and its grades with them.
    CourseDeleted { course: Course, grades_removed: usize },
    /// A student left. `grade_removed` is false if they had no grade.
    Left { course: Course, grade_removed: bool },
}

/// The caller's own courses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Home {
    pub user: User,
    pub courses: Vec<Course>,
}

/// Every course, plus the ones the caller belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub enrolled: Vec<Course>,
}

fn not_enrolled(user: &User, course: &Course) -> Error {
    Error::not_found("enrollment", format!("{} in {}", user.username, course.name))
}

fn already_enrolled(user: &User, course: &Course) -> Error {
    Error::duplicate("enrollment", format!("{} in {}", user.username, course.name))
}

/// The membership table an actor joins and leaves.
const fn joins_as(actor: &Actor) -> Membership {
    match actor {
        Actor::Teacher(_) => Membership::Teaching,
        Actor::Student(_) | Actor::Admin(_) => Membership::Attending,
    }
}

#[derive(Clone)]
pub struct EnrollmentService {
    pool: DbPool,
    registry: CourseRegistry,
}

impl EnrollmentService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            registry: CourseRegistry::new(pool.clone()),
            pool,
        }
    }

    /// Create a course owned by the calling teacher.
    ///
    /// # Errors
    /// Returns [`Error::Authorization`] for non-teachers and a validation
    /// error for a blank name or time, or a non-integer capacity.
    pub fn create_course(&self, session: &SessionState, form: &NewCourse) -> Result<Course> {
        let teacher = session.actor()?.as_teacher("create courses")?;
        require(&[(Field::Name, &form.name), (Field::Time, &form.time)])?;
        let capacity = form.capacity()?;
        self.registry.create(&form.name, &form.time, capacity, teacher)
    }

    /// Join a course by name.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown course and
    /// [`Error::DuplicateEntity`] if the caller already belongs to it in
    /// the role they would join as.
    pub fn enroll(&self, session: &SessionState, course_name: &str) -> Result<Membership> {
        let actor = session.actor()?;
        let user = actor.user();
        let membership = joins_as(actor);

        let course = transact(&self.pool, |conn| {
            let course = courses::require_by_name(conn, course_name)?;
            if courses::membership(conn, course.id, user.id, membership)?.is_enrolled() {
                return Err(already_enrolled(user, &course));
            }
            match membership {
                Membership::Teaching => {
                    courses::add_teacher(conn, course.id, user.id)?;
                    Ok(course)
                }
                Membership::Attending => {
                    let capacity = courses::adjust_capacity(conn, course.id, -1)?;
                    courses::add_student(conn, course.id, user.id)?;
                    // A stale row can survive an admin edit of the student list.
                    grades::delete(conn, course.id, user.id)?;
                    grades::insert(conn, course.id, user.id, INITIAL_GRADE)?;
                    Ok(Course { capacity, ..course })
                }
            }
        })?;

        info!(
            user = %user.username,
            course = %course.name,
            membership = ?membership,
            capacity = course.capacity,
            "Enrolled"
        );
        Ok(membership)
    }

    /// Leave a course by name.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown course or when the caller
    /// does not belong to it.
    pub fn unenroll(&self, session: &SessionState, course_name: &str) -> Result<Unenrollment> {
        let actor = session.actor()?;
        let user = actor.user();
        let membership = joins_as(actor);

        let outcome = transact(&self.pool, |conn| {
            let course = courses::require_by_name(conn, course_name)?;
            if !courses::membership(conn, course.id, user.id, membership)?.is_enrolled() {
                return Err(not_enrolled(user, &course));
            }
            match membership {
                Membership::Teaching => {
                    let grades_removed = CourseRegistry::delete_in(conn, course.id)?;
                    Ok(Unenrollment::CourseDeleted {
                        course,
                        grades_removed,
                    })
                }
                Membership::Attending => {
                    let capacity = courses::adjust_capacity(conn, course.id, 1)?;
                    courses::remove_student(conn, course.id, user.id)?;
                    let grade_removed = grades::delete(conn, course.id, user.id)?;
                    Ok(Unenrollment::Left {
                        course: Course { capacity, ..course },
                        grade_removed,
                    })
                }
            }
        })?;

        match &outcome {
            Unenrollment::CourseDeleted {
                course,
                grades_removed,
            } => info!(
                teacher = %user.username,
                course = %course.name,
                grades_removed,
                "Teacher left; course deleted"
            ),
            Unenrollment::Left {
                course,
                grade_removed,
            } => info!(
                user = %user.username,
                course = %course.name,
                grade_removed,
                "Unenrolled"
            ),
        }
        Ok(outcome)
    }

    /// Remove a named student from a course. Teachers only.
    ///
    /// The student's grade must exist; if it does not, nothing changes.
    /// Returns the course as it stands afterwards.
    ///
    /// # Errors
    /// Returns [`Error::Authorization`] for non-teachers,
    /// [`Error::NotFound`] for an unknown course, student or enrollment,
    /// and [`Error::MissingGradeRecord`] when the student has no grade.
    pub fn unenroll_user(
        &self,
        session: &SessionState,
        student_name: &str,
        course_name: &str,
    ) -> Result<Course> {
        let teacher = session.actor()?.as_teacher("remove students")?;

        let result = transact(&self.pool, |conn| {
            let course = courses::require_by_name(conn, course_name)?;
            let student = users::find_by_username(conn, student_name)?
                .ok_or_else(|| Error::not_found("user", student_name))?;
            if !courses::membership(conn, course.id, student.id, Membership::Attending)?.is_enrolled() {
                return Err(not_enrolled(&student, &course));
            }
            let capacity = courses::adjust_capacity(conn, course.id, 1)?;
            courses::remove_student(conn, course.id, student.id)?;
            grades::delete_existing(conn, course.id, student.id)?;
            Ok(Course { capacity, ..course })
        });

        match &result {
            Ok(course) => info!(
                teacher = %teacher.username,
                student = student_name,
                course = %course.name,
                capacity = course.capacity,
                "Student removed"
            ),
            Err(e) => warn!(
                teacher = %teacher.username,
                student = student_name,
                course = course_name,
                error = %e,
                "Student removal rolled back"
            ),
        }
        result
    }

    /// The caller's courses: taught for teachers, attended otherwise.
    ///
    /// # Errors
    /// Returns [`Error::Unauthenticated`] for anonymous callers.
    pub fn home(&self, session: &SessionState) -> Result<Home> {
        let actor = session.actor()?;
        let courses = self.own_courses(actor)?;
        Ok(Home {
            user: actor.user().clone(),
            courses,
        })
    }

    /// All courses, plus the caller's own.
    ///
    /// # Errors
    /// Returns [`Error::Unauthenticated`] for anonymous callers.
    pub fn catalog(&self, session: &SessionState) -> Result<Catalog> {
        let actor = session.actor()?;
        let all = read(&self.pool, courses::list_all)?;
        let enrolled = self.own_courses(actor)?;
        Ok(Catalog {
            courses: all,
            enrolled,
        })
    }

    fn own_courses(&self, actor: &Actor) -> Result<Vec<Course>> {
        let id = actor.user().id;
        read(&self.pool, |conn| match actor {
            Actor::Teacher(_) => courses::taught_by(conn, id),
            Actor::Student(_) | Actor::Admin(_) => courses::enrolled_by(conn, id),
        })
    }
}
