//! The acting user of a request, tagged by role.

use super::role::Role;
use super::user::User;
use crate::error::{Error, Result, SessionRejection};

/// An authenticated user, dispatched on role.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    Student(User),
    Teacher(User),
    Admin(User),
}

impl From<User> for Actor {
    fn from(user: User) -> Self {
        match user.role {
            Role::Student => Self::Student(user),
            Role::Teacher => Self::Teacher(user),
            Role::Admin => Self::Admin(user),
        }
    }
}

impl Actor {
    #[must_use]
    pub const fn user(&self) -> &User {
        match self {
            Self::Student(user) | Self::Teacher(user) | Self::Admin(user) => user,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Teacher(_) => Role::Teacher,
            Self::Admin(_) => Role::Admin,
        }
    }

    /// The user, if acting as a teacher.
    ///
    /// # Errors
    /// Returns [`Error::Authorization`] for any other role.
    pub fn as_teacher(&self, action: &'static str) -> Result<&User> {
        match self {
            Self::Teacher(user) => Ok(user),
            _ => Err(Error::Authorization {
                role: self.role(),
                action,
            }),
        }
    }

    /// The user, if acting as an administrator.
    ///
    /// # Errors
    /// Returns [`Error::Authorization`] for any other role.
    pub fn as_admin(&self, action: &'static str) -> Result<&User> {
        match self {
            Self::Admin(user) => Ok(user),
            _ => Err(Error::Authorization {
                role: self.role(),
                action,
            }),
        }
    }
}

/// The session context passed into every core operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous(SessionRejection),
    Authenticated(Actor),
}

impl SessionState {
    /// The acting user.
    ///
    /// # Errors
    /// Returns [`Error::Unauthenticated`] for anonymous callers.
    pub fn actor(&self) -> Result<&Actor> {
        match self {
            Self::Authenticated(actor) => Ok(actor),
            Self::Anonymous(reason) => Err(Error::Unauthenticated(*reason)),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<User> for SessionState {
    fn from(user: User) -> Self {
        Self::Authenticated(Actor::from(user))
    }
}
