//! Administrative editor over the user, course and grade tables.
//!
//! Edits here bypass [`EnrollmentService`](super::EnrollmentService): they
//! write rows directly and only apply the capacity adjustment described on
//! [`AdminEditor::update_course`].

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::{read, transact, CourseRegistry};
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::{courses, grades, users};
use crate::domain::course::{course_names_for, parse_capacity};
use crate::domain::error::require;
use crate::domain::grade::parse_grade;
use crate::domain::{Course, CourseId, Field, Grade, GradeId, Role, SessionState, User, UserId};
use crate::error::{Error, Result};
use crate::port::{Clock, PasswordHasher};

const ACTION: &str = "use the admin editor";
const DANGLING: &str = "N/A";

/// One row of the user table view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListing {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    /// Taught courses for teachers, attended courses otherwise.
    pub courses: String,
}

/// One row of the course table view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseListing {
    pub id: CourseId,
    pub name: String,
    pub time: String,
    pub capacity: i32,
    pub teachers: String,
    pub students: String,
}

/// One row of the grade table view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeListing {
    pub id: GradeId,
    pub course_name: String,
    pub student_username: String,
    pub value: f64,
}

/// User form. On update, `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserEdit {
    pub username: String,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Course form. `teachers` / `students` are usernames; `None` leaves the
/// membership unchanged.
#[derive(Debug, Clone, Default)]
pub struct CourseEdit {
    pub name: String,
    pub time: String,
    pub capacity: Option<String>,
    pub teachers: Option<Vec<String>>,
    pub students: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct AdminEditor {
    pool: DbPool,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl AdminEditor {
    pub fn new(pool: DbPool, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self { pool, hasher, clock }
    }

    fn admin<'a>(session: &'a SessionState) -> Result<&'a User> {
        session.actor()?.as_admin(ACTION)
    }

    /// # Errors
    /// Returns [`Error::Authorization`] for non-admins.
    pub fn users(&self, session: &SessionState) -> Result<Vec<UserListing>> {
        Self::admin(session)?;
        read(&self.pool, |conn| {
            users::list(conn)?
                .into_iter()
                .map(|user| -> Result<UserListing> {
                    let taught = courses::taught_by(conn, user.id)?;
                    let enrolled = courses::enrolled_by(conn, user.id)?;
                    Ok(UserListing {
                        courses: course_names_for(user.role, &taught, &enrolled),
                        id: user.id,
                        username: user.username,
                        role: user.role,
                    })
                })
                .collect()
        })
    }

    /// # Errors
    /// Returns a validation error if the username or password is blank, or
    /// [`Error::DuplicateEntity`] if the username is taken.
    pub fn create_user(&self, session: &SessionState, edit: &UserEdit) -> Result<User> {
        let admin = Self::admin(session)?;
        let password = edit.password.as_deref().unwrap_or_default();
        require(&[(Field::Username, &edit.username), (Field::Password, password)])?;
        let hash = self.hasher.hash(password)?;
        let role = edit.role.unwrap_or_default();
        let now = self.clock.now();

        let user = transact(&self.pool, |conn| users::insert(conn, &edit.username, &hash, role, now))?;
        info!(admin = %admin.username, user = %user.username, role = %role, "Admin created user");
        Ok(user)
    }

    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown id and
    /// [`Error::DuplicateEntity`] when renaming onto a taken username.
    pub fn update_user(&self, session: &SessionState, id: UserId, edit: &UserEdit) -> Result<User> {
        let admin = Self::admin(session)?;
        require(&[(Field::Username, &edit.username)])?;
        let hash = edit
            .password
            .as_deref()
            .filter(|password| !password.is_empty())
            .map(|password| self.hasher.hash(password))
            .transpose()?;

        let user = transact(&self.pool, |conn| {
            users::find_by_id(conn, id)?.ok_or_else(|| Error::not_found("user", id.to_string()))?;
            users::rename(conn, id, &edit.username)?;
            if let Some(role) = edit.role {
                users::set_role(conn, id, role)?;
            }
            if let Some(hash) = &hash {
                users::set_password_hash(conn, id, hash)?;
            }
            users::find_by_id(conn, id)?.ok_or_else(|| Error::not_found("user", id.to_string()))
        })?;
        info!(admin = %admin.username, user = %user.username, role = %user.role, "Admin updated user");
        Ok(user)
    }

    /// Delete a user with their memberships and grades.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn delete_user(&self, session: &SessionState, id: UserId) -> Result<()> {
        let admin = Self::admin(session)?;
        let deleted = transact(&self.pool, |conn| users::delete(conn, id))?;
        if !deleted {
            return Err(Error::not_found("user", id.to_string()));
        }
        info!(admin = %admin.username, id = %id, "Admin deleted user");
        Ok(())
    }

    /// # Errors
    /// Returns [`Error::Authorization`] for non-admins.
    pub fn courses(&self, session: &SessionState) -> Result<Vec<CourseListing>> {
        Self::admin(session)?;
        read(&self.pool, |conn| {
            courses::list_all(conn)?
                .into_iter()
                .map(|course| -> Result<CourseListing> {
                    let roster = courses::roster(conn, course)?;
                    Ok(CourseListing {
                        teachers: roster.teacher_names(),
                        students: roster.student_names(),
                        id: roster.course.id,
                        name: roster.course.name,
                        time: roster.course.schedule,
                        capacity: roster.course.capacity,
                    })
                })
                .collect()
        })
    }

    /// Create a course row directly. Submitted students reduce the
    /// capacity exactly as in [`AdminEditor::update_course`].
    ///
    /// # Errors
    /// Returns a validation error for blank name/time or a bad capacity,
    /// and [`Error::NotFound`] for an unknown member username.
    pub fn create_course(&self, session: &SessionState, edit: &CourseEdit) -> Result<Course> {
        let admin = Self::admin(session)?;
        require(&[(Field::Name, &edit.name), (Field::Time, &edit.time)])?;
        let capacity = parse_capacity(edit.capacity.as_deref())?;

        let course = transact(&self.pool, |conn| {
            let course = courses::insert(conn, &edit.name, &edit.time, capacity)?;
            Self::apply_membership(conn, course.id, capacity, edit)?;
            courses::find_by_id(conn, course.id)?
                .ok_or_else(|| Error::not_found("course", course.id.to_string()))
        })?;
        info!(admin = %admin.username, course = %course.name, capacity = course.capacity, "Admin created course");
        Ok(course)
    }

    /// Overwrite a course's fields and, if given, its membership lists.
    ///
    /// When a student list is submitted the membership is replaced with it
    /// (no grade rows are created or removed) and the stored capacity
    /// becomes `submitted capacity - number of submitted students`. The
    /// subtraction happens on every save, so saving the same list twice
    /// lowers the capacity twice.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown course or member username
    /// and a validation error for bad fields.
    pub fn update_course(&self, session: &SessionState, id: CourseId, edit: &CourseEdit) -> Result<Course> {
        let admin = Self::admin(session)?;
        require(&[(Field::Name, &edit.name), (Field::Time, &edit.time)])?;
        let capacity = parse_capacity(edit.capacity.as_deref())?;

        let course = transact(&self.pool, |conn| {
            courses::update(conn, id, &edit.name, &edit.time, capacity)?;
            Self::apply_membership(conn, id, capacity, edit)?;
            courses::find_by_id(conn, id)?.ok_or_else(|| Error::not_found("course", id.to_string()))
        })?;
        info!(admin = %admin.username, course = %course.name, capacity = course.capacity, "Admin updated course");
        Ok(course)
    }

    fn apply_membership(
        conn: &mut diesel::SqliteConnection,
        course: CourseId,
        capacity: i32,
        edit: &CourseEdit,
    ) -> Result<()> {
        if let Some(names) = &edit.teachers {
            let teachers = users::find_all_by_username(conn, names)?;
            courses::set_teachers(conn, course, &teachers)?;
        }
        if let Some(names) = &edit.students {
            let students = users::find_all_by_username(conn, names)?;
            courses::set_students(conn, course, &students)?;
            let submitted = i32::try_from(names.len()).unwrap_or(i32::MAX);
            courses::update_capacity(conn, course, capacity.saturating_sub(submitted))?;
        }
        Ok(())
    }

    /// Delete a course with its memberships and grades.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn delete_course(&self, session: &SessionState, id: CourseId) -> Result<usize> {
        let admin = Self::admin(session)?;
        let removed = transact(&self.pool, |conn| CourseRegistry::delete_in(conn, id))?;
        info!(admin = %admin.username, id = %id, grades_removed = removed, "Admin deleted course");
        Ok(removed)
    }

    /// # Errors
    /// Returns [`Error::Authorization`] for non-admins.
    pub fn grades(&self, session: &SessionState) -> Result<Vec<GradeListing>> {
        Self::admin(session)?;
        read(&self.pool, |conn| {
            grades::list_all(conn)?
                .into_iter()
                .map(|grade| -> Result<GradeListing> {
                    let course_name = courses::find_by_id(conn, grade.course_id)?
                        .map_or_else(|| DANGLING.to_string(), |course| course.name);
                    let student_username = users::find_by_id(conn, grade.student_id)?
                        .map_or_else(|| DANGLING.to_string(), |user| user.username);
                    Ok(GradeListing {
                        id: grade.id,
                        course_name,
                        student_username,
                        value: grade.value,
                    })
                })
                .collect()
        })
    }

    /// Overwrite a grade's value. The (course, student) pair is fixed.
    ///
    /// # Errors
    /// Returns a validation error for a bad value and [`Error::NotFound`]
    /// for an unknown id.
    pub fn update_grade(&self, session: &SessionState, id: GradeId, raw_value: &str) -> Result<Grade> {
        let admin = Self::admin(session)?;
        let value = parse_grade(raw_value)?;
        let grade = transact(&self.pool, |conn| {
            if !grades::update_by_id(conn, id, value)? {
                return Err(Error::not_found("grade", id.to_string()));
            }
            grades::find_by_id(conn, id)?.ok_or_else(|| Error::not_found("grade", id.to_string()))
        })?;
        info!(admin = %admin.username, id = %id, value, "Admin updated grade");
        Ok(grade)
    }

    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn delete_grade(&self, session: &SessionState, id: GradeId) -> Result<()> {
        let admin = Self::admin(session)?;
        if !transact(&self.pool, |conn| grades::delete_by_id(conn, id))? {
            return Err(Error::not_found("grade", id.to_string()));
        }
        info!(admin = %admin.username, id = %id, "Admin deleted grade");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::adapter::outbound::hasher::Argon2Hasher;
    use crate::adapter::outbound::sqlite::database::connection::{open, MEMORY_URL};

    struct Fixture {
        pool: DbPool,
        editor: AdminEditor,
        admin: SessionState,
    }

    fn fixture() -> Fixture {
        let pool = open(MEMORY_URL, 1).unwrap();
        let admin = {
            let mut conn = pool.get().unwrap();
            users::insert(&mut conn, "root", "h", Role::Admin, Utc::now()).unwrap()
        };
        Fixture {
            editor: AdminEditor::new(
                pool.clone(),
                Arc::new(Argon2Hasher::fast()),
                Arc::new(crate::port::SystemClock),
            ),
            pool,
            admin: SessionState::from(admin),
        }
    }

    impl Fixture {
        fn user(&self, name: &str, role: Role) -> User {
            let mut conn = self.pool.get().unwrap();
            users::insert(&mut conn, name, "h", role, Utc::now()).unwrap()
        }
    }

    fn course_edit(students: Option<&[&str]>) -> CourseEdit {
        CourseEdit {
            name: "CS101".into(),
            time: "MWF".into(),
            capacity: Some("10".into()),
            teachers: None,
            students: students.map(|names| names.iter().map(ToString::to_string).collect()),
        }
    }

    #[test]
    fn non_admins_are_refused() {
        let f = fixture();
        let teacher = SessionState::from(f.user("turing", Role::Teacher));
        assert!(matches!(
            f.editor.users(&teacher),
            Err(Error::Authorization { role: Role::Teacher, .. })
        ));
        assert!(matches!(f.editor.grades(&teacher), Err(Error::Authorization { .. })));
    }

    #[test]
    fn user_listing_shows_courses_by_role() {
        let f = fixture();
        let turing = f.user("turing", Role::Teacher);
        let ada = f.user("ada", Role::Student);
        {
            let mut conn = f.pool.get().unwrap();
            let course = courses::insert(&mut conn, "CS101", "MWF", 10).unwrap();
            courses::add_teacher(&mut conn, course.id, turing.id).unwrap();
            courses::add_student(&mut conn, course.id, ada.id).unwrap();
            let other = courses::insert(&mut conn, "MATH200", "TTh", 10).unwrap();
            courses::add_student(&mut conn, other.id, ada.id).unwrap();
        }

        let listing = f.editor.users(&f.admin).unwrap();
        let courses_of = |name: &str| {
            listing
                .iter()
                .find(|row| row.username == name)
                .map(|row| row.courses.clone())
                .unwrap()
        };
        assert_eq!(courses_of("turing"), "CS101");
        assert_eq!(courses_of("ada"), "CS101, MATH200");
        assert_eq!(courses_of("root"), "");
    }

    #[test]
    fn user_crud() {
        let f = fixture();
        let created = f
            .editor
            .create_user(
                &f.admin,
                &UserEdit {
                    username: "hopper".into(),
                    password: Some("cobol".into()),
                    role: Some(Role::Teacher),
                },
            )
            .unwrap();
        assert_eq!(created.role, Role::Teacher);

        let updated = f
            .editor
            .update_user(
                &f.admin,
                created.id,
                &UserEdit {
                    username: "grace".into(),
                    password: None,
                    role: Some(Role::Admin),
                },
            )
            .unwrap();
        assert_eq!(updated.username, "grace");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.password_hash(), created.password_hash());

        f.editor.delete_user(&f.admin, created.id).unwrap();
        assert!(matches!(
            f.editor.delete_user(&f.admin, created.id),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn create_user_needs_password() {
        let f = fixture();
        let edit = UserEdit {
            username: "nopass".into(),
            ..UserEdit::default()
        };
        assert!(matches!(f.editor.create_user(&f.admin, &edit), Err(Error::Validation(_))));
    }

    #[test]
    fn student_list_edit_subtracts_submitted_count() {
        let f = fixture();
        f.user("ada", Role::Student);
        f.user("grace", Role::Student);

        let course = f.editor.create_course(&f.admin, &course_edit(None)).unwrap();
        assert_eq!(course.capacity, 10);

        let edited = f
            .editor
            .update_course(&f.admin, course.id, &course_edit(Some(&["ada", "grace"])))
            .unwrap();
        assert_eq!(edited.capacity, 8);

        // Saving again with the stored capacity subtracts again.
        let mut again = course_edit(Some(&["ada", "grace"]));
        again.capacity = Some(edited.capacity.to_string());
        let twice = f.editor.update_course(&f.admin, course.id, &again).unwrap();
        assert_eq!(twice.capacity, 6);

        let rows = f.editor.courses(&f.admin).unwrap();
        assert_eq!(rows[0].students, "ada, grace");
        assert!(f.editor.grades(&f.admin).unwrap().is_empty());
    }

    #[test]
    fn teacher_list_edit_leaves_capacity() {
        let f = fixture();
        f.user("turing", Role::Teacher);
        let course = f.editor.create_course(&f.admin, &course_edit(None)).unwrap();

        let mut edit = course_edit(None);
        edit.teachers = Some(vec!["turing".into()]);
        let edited = f.editor.update_course(&f.admin, course.id, &edit).unwrap();
        assert_eq!(edited.capacity, 10);
        assert_eq!(f.editor.courses(&f.admin).unwrap()[0].teachers, "turing");

        edit.teachers = Some(vec!["nobody".into()]);
        assert!(matches!(
            f.editor.update_course(&f.admin, course.id, &edit),
            Err(Error::NotFound { entity: "user", .. })
        ));
        assert_eq!(f.editor.courses(&f.admin).unwrap()[0].teachers, "turing");
    }

    #[test]
    fn grade_listing_update_and_delete() {
        let f = fixture();
        let ada = f.user("ada", Role::Student);
        let grade = {
            let mut conn = f.pool.get().unwrap();
            let course = courses::insert(&mut conn, "CS101", "MWF", 10).unwrap();
            grades::insert(&mut conn, course.id, ada.id, 0.0).unwrap()
        };

        let rows = f.editor.grades(&f.admin).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course_name, "CS101");
        assert_eq!(rows[0].student_username, "ada");

        let updated = f.editor.update_grade(&f.admin, grade.id, "77").unwrap();
        assert!((updated.value - 77.0).abs() < f64::EPSILON);
        assert!(matches!(
            f.editor.update_grade(&f.admin, grade.id, "x"),
            Err(Error::Validation(_))
        ));

        f.editor.delete_grade(&f.admin, grade.id).unwrap();
        assert!(matches!(
            f.editor.delete_grade(&f.admin, grade.id),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn delete_course_cascades() {
        let f = fixture();
        let ada = f.user("ada", Role::Student);
        let course = f.editor.create_course(&f.admin, &course_edit(Some(&["ada"]))).unwrap();
        assert_eq!(course.capacity, 9);
        {
            let mut conn = f.pool.get().unwrap();
            grades::insert(&mut conn, course.id, ada.id, 50.0).unwrap();
        }
        assert_eq!(f.editor.delete_course(&f.admin, course.id).unwrap(), 1);
        assert!(f.editor.courses(&f.admin).unwrap().is_empty());
    }
}
