//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::sync::Arc;

use super::clock::ManualClock;
use crate::adapter::outbound::hasher::Argon2Hasher;
use crate::adapter::outbound::sqlite::database::connection::{open, MEMORY_URL};
use crate::app::App;
use crate::config::{Config, SessionConfig};

/// Session settings matching the shipped defaults: 30 seconds, bound.
pub fn session() -> SessionConfig {
    SessionConfig {
        lifetime_secs: 30,
        bind_fingerprint: true,
    }
}

/// A config pointing at a private in-memory database.
pub fn in_memory() -> Config {
    let mut config = Config::default();
    config.database.url = MEMORY_URL.into();
    config.server.port = 0;
    config
}

/// An app over a fresh in-memory database, a cheap hasher and the given clock.
///
/// # Panics
/// Panics if the in-memory database cannot be opened.
pub fn app_with_clock(clock: Arc<ManualClock>) -> App {
    let pool = open(MEMORY_URL, 1).expect("in-memory database");
    App::from_parts(
        pool,
        Arc::new(Argon2Hasher::fast()),
        clock,
        &session(),
    )
}

/// An app over a fresh in-memory database with its own manual clock.
pub fn app() -> (App, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    (app_with_clock(clock.clone()), clock)
}
