//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - [`ManualClock`](clock::ManualClock), a clock tests advance by hand.
//! - [`domain`] - Builders for users and client contexts.
//! - [`config`] - Canonical test configurations and the in-memory [`App`](crate::app::App).

pub mod clock;
pub mod config;
pub mod domain;
