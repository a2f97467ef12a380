use thiserror::Error;

use crate::domain::error::ValidationError;
use crate::domain::role::Role;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Why a request could not be tied to a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// No session token was presented, or the token is unknown.
    Missing,
    /// The session outlived its absolute lifetime.
    Expired,
    /// The session was presented from a different client than the one that opened it.
    ClientMismatch,
    /// The session's user no longer exists.
    UserGone,
}

impl std::fmt::Display for SessionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Missing => "no active session",
            Self::Expired => "session expired",
            Self::ClientMismatch => "session used from a different client",
            Self::UserGone => "session user no longer exists",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} already exists: {key}")]
    DuplicateEntity { entity: &'static str, key: String },

    /// Bad credentials. The message never says whether the user exists.
    #[error("Incorrect Password")]
    AuthenticationFailure,

    #[error("authentication required: {0}")]
    Unauthenticated(SessionRejection),

    #[error("{role} may not {action}")]
    Authorization { role: Role, action: &'static str },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("no grade record for student {student} in course {course}")]
    MissingGradeRecord { course: String, student: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            entity,
            key: key.into(),
        }
    }

    /// Stable machine-readable code used by the HTTP and CLI surfaces.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::DuplicateEntity { .. } => "duplicate",
            Self::AuthenticationFailure => "authentication",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Authorization { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::MissingGradeRecord { .. } => "missing_grade_record",
            Self::Json(_) | Self::Parse(_) => "parse",
            Self::Io(_) | Self::Connection(_) | Self::Database(_) | Self::Internal(_) => "internal",
        }
    }
}

// Transaction closures need `From<diesel::result::Error>`.
impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Connection(err.to_string())
    }
}
