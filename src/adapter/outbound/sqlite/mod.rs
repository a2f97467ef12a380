//! SQLite persistence adapters.
//!
//! Provides the identity store, course registry and grade ledger tables
//! using Diesel ORM. Every function here takes a borrowed connection so
//! the application layer can compose several of them inside one
//! transaction.

pub mod courses;
pub mod database;
pub mod grades;
pub mod users;
