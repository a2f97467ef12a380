//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! collaborators (password hashing, wall-clock time).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  HTTP   │            │   SQLite    │              │  Hasher   │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! Persistence is not behind a port: enrollment transitions need the
//! SQLite transaction handle itself, so the application layer talks to
//! `adapter::outbound::sqlite` directly.

pub mod outbound;

pub use outbound::clock::{Clock, SystemClock};
pub use outbound::hasher::PasswordHasher;
