//! Application services. Depend on domain, port, and the SQLite adapter.
//!
//! Every mutating operation runs inside one `BEGIN IMMEDIATE` transaction so
//! capacity, memberships and grade rows commit or roll back together, and
//! concurrent transitions on the same database serialize.

pub mod access;
pub mod admin;
pub mod enrollment;
pub mod identity;
pub mod ledger;
pub mod registry;

pub use access::{AccessControl, Landing, Login};
pub use admin::{AdminEditor, CourseEdit, CourseListing, GradeListing, UserEdit, UserListing};
pub use enrollment::{Catalog, EnrollmentService, Home, NewCourse, Unenrollment};
pub use identity::IdentityStore;
pub use ledger::{GradeLedger, GradeSheet, GradeSheetEntry};
pub use registry::CourseRegistry;

use diesel::SqliteConnection;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::error::Result;

/// Run `f` inside an immediate (write-locking) transaction.
pub(crate) fn transact<T>(
    pool: &DbPool,
    f: impl FnOnce(&mut SqliteConnection) -> Result<T>,
) -> Result<T> {
    let mut conn = pool.get()?;
    conn.immediate_transaction(f)
}

/// Run read-only `f` on a pooled connection.
pub(crate) fn read<T>(
    pool: &DbPool,
    f: impl FnOnce(&mut SqliteConnection) -> Result<T>,
) -> Result<T> {
    let mut conn = pool.get()?;
    f(&mut *conn)
}
