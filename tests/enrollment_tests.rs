mod support;

use roster::application::Unenrollment;
use roster::domain::{Membership, Role};
use roster::error::Error;
use roster::testkit::config::app;
use roster::testkit::domain::{student, teacher};
use support::fixtures::{course, grade_count, seats};

#[test]
fn register_then_authenticate_and_reject_duplicates() {
    let (app, _) = app();
    let user = app.identity.register("ada", "lovelace").unwrap();
    assert_eq!(user.role, Role::Student);

    let authenticated = app.identity.authenticate("ada", "lovelace").unwrap();
    assert_eq!(authenticated.id, user.id);

    assert!(matches!(
        app.identity.register("ada", "other"),
        Err(Error::DuplicateEntity { .. })
    ));
}

#[test]
fn student_enroll_takes_a_seat_and_opens_a_zero_grade() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let ada = student(&app, "ada");
    let cs101 = course(&app, &turing, "CS101", 10);

    assert_eq!(app.enrollment.enroll(&ada, "CS101").unwrap(), Membership::Attending);
    assert_eq!(seats(&app, "CS101"), 9);
    assert_eq!(grade_count(&app, "CS101"), 1);

    let ada_id = ada.actor().unwrap().user().id;
    assert_eq!(app.ledger.peek(ada_id, cs101.id).unwrap(), Some(0.0));
}

#[test]
fn student_unenroll_restores_the_seat_and_drops_the_grade() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let ada = student(&app, "ada");
    let cs101 = course(&app, &turing, "CS101", 10);
    app.enrollment.enroll(&ada, "CS101").unwrap();

    let outcome = app.enrollment.unenroll(&ada, "CS101").unwrap();
    assert!(matches!(outcome, Unenrollment::Left { grade_removed: true, .. }));
    assert_eq!(seats(&app, "CS101"), 10);
    assert_eq!(grade_count(&app, "CS101"), 0);

    // A missing grade does not block leaving.
    app.enrollment.enroll(&ada, "CS101").unwrap();
    let ada_id = ada.actor().unwrap().user().id;
    app.ledger.delete(ada_id, cs101.id).unwrap();
    let outcome = app.enrollment.unenroll(&ada, "CS101").unwrap();
    assert!(matches!(outcome, Unenrollment::Left { grade_removed: false, .. }));
    assert_eq!(seats(&app, "CS101"), 10);
}

#[test]
fn teacher_unenroll_deletes_the_course_and_its_grades() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let ada = student(&app, "ada");
    let grace = student(&app, "grace");
    course(&app, &turing, "CS101", 10);
    app.enrollment.enroll(&ada, "CS101").unwrap();
    app.enrollment.enroll(&grace, "CS101").unwrap();

    let outcome = app.enrollment.unenroll(&turing, "CS101").unwrap();
    assert!(matches!(
        outcome,
        Unenrollment::CourseDeleted { grades_removed: 2, .. }
    ));
    assert!(matches!(
        app.registry.find_by_name("CS101"),
        Err(Error::NotFound { entity: "course", .. })
    ));
    assert!(app.enrollment.home(&ada).unwrap().courses.is_empty());
}

#[test]
fn teacher_removal_insists_on_an_existing_grade() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let ada = student(&app, "ada");
    let cs101 = course(&app, &turing, "CS101", 10);
    app.enrollment.enroll(&ada, "CS101").unwrap();

    let ada_id = ada.actor().unwrap().user().id;
    app.ledger.delete(ada_id, cs101.id).unwrap();
    assert!(matches!(
        app.enrollment.unenroll_user(&turing, "ada", "CS101"),
        Err(Error::MissingGradeRecord { .. })
    ));
    // Rolled back: still enrolled, seat still taken.
    assert_eq!(seats(&app, "CS101"), 9);
    assert!(app.registry.roster("CS101").unwrap().has_student(ada_id));

    app.ledger.get_or_create(ada_id, cs101.id).unwrap();
    let course = app.enrollment.unenroll_user(&turing, "ada", "CS101").unwrap();
    assert_eq!(course.capacity, 10);
    assert!(!app.registry.roster("CS101").unwrap().has_student(ada_id));
}

#[test]
fn get_or_create_creates_once_then_returns_the_stored_value() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let ada = student(&app, "ada");
    let cs101 = course(&app, &turing, "CS101", 10);
    let ada_id = ada.actor().unwrap().user().id;

    assert_eq!(app.ledger.peek(ada_id, cs101.id).unwrap(), None);
    assert_eq!(app.ledger.get_or_create(ada_id, cs101.id).unwrap(), 0.0);
    app.ledger.set(ada_id, cs101.id, 71.5).unwrap();
    assert_eq!(app.ledger.get_or_create(ada_id, cs101.id).unwrap(), 71.5);
}

#[test]
fn cs101_scenario() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    course(&app, &turing, "CS101", 10);

    for name in ["ada", "grace", "linus"] {
        let session = student(&app, name);
        app.enrollment.enroll(&session, "CS101").unwrap();
    }
    assert_eq!(seats(&app, "CS101"), 7);
    assert_eq!(grade_count(&app, "CS101"), 3);

    let course = app.enrollment.unenroll_user(&turing, "grace", "CS101").unwrap();
    assert_eq!(course.capacity, 8);
    assert_eq!(seats(&app, "CS101"), 8);
    assert_eq!(grade_count(&app, "CS101"), 2);

    let roster = app.registry.roster("CS101").unwrap();
    assert_eq!(roster.student_names(), "ada, linus");
}

#[test]
fn re_enrolling_and_leaving_twice_are_rejected_without_side_effects() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let ada = student(&app, "ada");
    course(&app, &turing, "CS101", 10);

    app.enrollment.enroll(&ada, "CS101").unwrap();
    assert!(matches!(
        app.enrollment.enroll(&ada, "CS101"),
        Err(Error::DuplicateEntity { entity: "enrollment", .. })
    ));
    assert_eq!(seats(&app, "CS101"), 9);

    app.enrollment.unenroll(&ada, "CS101").unwrap();
    assert!(matches!(
        app.enrollment.unenroll(&ada, "CS101"),
        Err(Error::NotFound { entity: "enrollment", .. })
    ));
    assert_eq!(seats(&app, "CS101"), 10);
}

#[test]
fn full_courses_go_negative() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    course(&app, &turing, "Seminar", 1);

    app.enrollment.enroll(&student(&app, "ada"), "Seminar").unwrap();
    app.enrollment.enroll(&student(&app, "grace"), "Seminar").unwrap();
    assert_eq!(seats(&app, "Seminar"), -1);
}

#[test]
fn teachers_join_the_teacher_set_without_a_seat() {
    let (app, _) = app();
    let turing = teacher(&app, "turing");
    let hopper = teacher(&app, "hopper");
    course(&app, &turing, "CS101", 10);

    assert_eq!(app.enrollment.enroll(&hopper, "CS101").unwrap(), Membership::Teaching);
    assert_eq!(seats(&app, "CS101"), 10);
    assert_eq!(app.registry.roster("CS101").unwrap().teacher_names(), "turing, hopper");
}
