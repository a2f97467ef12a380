//! Storage-agnostic domain types: users, courses, grades, sessions.

pub mod actor;
pub mod course;
pub mod error;
pub mod grade;
pub mod id;
pub mod role;
pub mod session;
pub mod user;

pub use actor::{Actor, SessionState};
pub use course::{Course, CourseRoster, EnrollmentState, Membership, DEFAULT_CAPACITY};
pub use error::{Field, ValidationError};
pub use grade::{Grade, INITIAL_GRADE};
pub use id::{CourseId, GradeId, SessionToken, UserId};
pub use role::Role;
pub use session::{ClientContext, Session};
pub use user::User;
