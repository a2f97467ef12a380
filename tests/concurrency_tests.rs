mod support;

use std::sync::Arc;
use std::thread;

use roster::adapter::outbound::hasher::Argon2Hasher;
use roster::adapter::outbound::sqlite::database::connection::open;
use roster::app::App;
use roster::domain::{Role, SessionState};
use roster::testkit::clock::ManualClock;
use roster::testkit::config::session;
use roster::testkit::domain::session as login_as;
use support::fixtures::{course, grade_count, seats};
use tempfile::TempDir;

const POOL_SIZE: u32 = 8;

/// An app over a file-backed database with several pooled connections, so
/// transitions really run side by side.
fn file_app() -> (App, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = dir.path().join("roster.db").to_string_lossy().into_owned();
    let pool = open(&url, POOL_SIZE).expect("open database");
    assert_eq!(pool.max_size(), POOL_SIZE);
    let app = App::from_parts(
        pool,
        Arc::new(Argon2Hasher::fast()),
        Arc::new(ManualClock::default()),
        &session(),
    );
    (app, dir)
}

fn students(app: &App, prefix: &str, count: usize) -> Vec<SessionState> {
    (0..count)
        .map(|i| login_as(app, &format!("{prefix}{i}"), Role::Student))
        .collect()
}

#[test]
fn parallel_enrollments_lose_no_seats() {
    let (app, _dir) = file_app();
    let teacher = login_as(&app, "turing", Role::Teacher);
    course(&app, &teacher, "CS101", 100);
    let class = students(&app, "student", 40);

    thread::scope(|scope| {
        for student in &class {
            let app = &app;
            scope.spawn(move || app.enrollment.enroll(student, "CS101").expect("enroll"));
        }
    });

    assert_eq!(seats(&app, "CS101"), 60);
    assert_eq!(grade_count(&app, "CS101"), 40);
    assert_eq!(app.registry.roster("CS101").unwrap().students.len(), 40);
}

#[test]
fn mixed_joins_and_leaves_settle_on_the_same_count() {
    let (app, _dir) = file_app();
    let teacher = login_as(&app, "turing", Role::Teacher);
    course(&app, &teacher, "CS101", 100);
    let leaving = students(&app, "leaving", 20);
    let joining = students(&app, "joining", 10);
    for student in &leaving {
        app.enrollment.enroll(student, "CS101").unwrap();
    }
    assert_eq!(seats(&app, "CS101"), 80);

    thread::scope(|scope| {
        for student in &leaving {
            let app = &app;
            scope.spawn(move || {
                app.enrollment.unenroll(student, "CS101").expect("unenroll");
            });
        }
        for student in &joining {
            let app = &app;
            scope.spawn(move || {
                app.enrollment.enroll(student, "CS101").expect("enroll");
            });
        }
    });

    assert_eq!(seats(&app, "CS101"), 90);
    assert_eq!(grade_count(&app, "CS101"), 10);
    let roster = app.registry.roster("CS101").unwrap();
    assert_eq!(roster.students.len(), 10);
    assert!(roster
        .students
        .iter()
        .all(|student| student.username.starts_with("joining")));
}
