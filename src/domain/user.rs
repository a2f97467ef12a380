//! User records.

use serde::Serialize;

use super::id::UserId;
use super::role::Role;

/// A registered user.
///
/// The password hash never leaves the crate through serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip)]
    password_hash: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        }
    }

    /// The stored salted hash, in the hasher's encoded form.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}
