//! Course and enrollment fixtures built on the testkit app.

use roster::app::App;
use roster::application::NewCourse;
use roster::domain::{Course, Role, SessionState};
use roster::testkit::domain::{user, PASSWORD};

const AUDITOR: &str = "fixture-auditor";

/// Create a course taught by `teacher`.
pub fn course(app: &App, teacher: &SessionState, name: &str, capacity: i32) -> Course {
    app.enrollment
        .create_course(teacher, &NewCourse::new(name, "MWF 9am", Some(capacity)))
        .expect("create course")
}

/// Remaining seats in the oldest course named `name`.
pub fn seats(app: &App, name: &str) -> i32 {
    app.registry.find_by_name(name).expect("course").capacity
}

/// An admin session that does not enroll in anything.
pub fn auditor(app: &App) -> SessionState {
    let admin = match app.identity.authenticate(AUDITOR, PASSWORD) {
        Ok(existing) => existing,
        Err(_) => user(app, AUDITOR, Role::Admin),
    };
    SessionState::from(admin)
}

/// Grade rows whose course is named `name`, read through the admin editor.
pub fn grade_count(app: &App, name: &str) -> usize {
    app.admin
        .grades(&auditor(app))
        .expect("list grades")
        .iter()
        .filter(|grade| grade.course_name == name)
        .count()
}
