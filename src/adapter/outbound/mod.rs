//! Outbound adapters (driven side).

pub mod hasher;
pub mod sqlite;
