//! Roster - course registration, enrollment and grading.
//!
//! Users register, log in, and act under one of three roles. Teachers
//! create courses; students enroll into them, which consumes a seat and
//! opens a grade record at 0.0; teachers record grades and can remove
//! students; an admin editor edits every table directly.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Storage-agnostic types: users, roles, courses, grades,
//!   sessions and the acting-user dispatch (`Actor`)
//! - **`port`** - Traits for collaborators the core needs: password hashing
//!   and wall-clock time
//! - **`application`** - Services composing domain rules with persistence,
//!   one SQLite transaction per state transition
//! - **`adapter`** - SQLite storage, the password hasher, the HTTP server
//!   and the command line
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files and the environment
//! - [`domain`] - Users, courses, grades, sessions
//! - [`application`] - Identity, registry, ledger, enrollment, access control, admin editor
//! - [`app`] - Wiring of every service over one database pool
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - In-memory app builder and manual clock for tests
//!
//! # Example
//!
//! ```
//! use roster::domain::grade::parse_grade;
//! use roster::domain::Role;
//!
//! assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
//! assert_eq!(parse_grade(" 88.5 ").unwrap(), 88.5);
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
