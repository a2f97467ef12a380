//! Input validation errors for domain operations.
//!
//! Validation failures carry the offending [`Field`]s so the request boundary
//! can render one message per field (for example `Username Required` next to
//! the username input).
//!
//! # Examples
//!
//! ```
//! use roster::domain::error::{require, Field, ValidationError};
//!
//! let result = require(&[(Field::Username, ""), (Field::Password, "hunter2")]);
//! assert_eq!(result, Err(ValidationError::missing([Field::Username])));
//! ```

use serde::Serialize;
use thiserror::Error;

/// A user-supplied input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Username,
    Password,
    Name,
    Time,
    Capacity,
    Grade,
    Role,
}

impl Field {
    /// Stable field name used in form bodies and error payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Name => "name",
            Self::Time => "time",
            Self::Capacity => "capacity",
            Self::Grade => "grade",
            Self::Role => "role",
        }
    }

    /// Message shown next to the field when it was left blank.
    #[must_use]
    pub const fn required_message(self) -> &'static str {
        match self {
            Self::Username => "Username Required",
            Self::Password => "Password Required",
            Self::Name => "Name Required",
            Self::Time => "Time Required",
            Self::Capacity => "Capacity Required",
            Self::Grade => "Grade Required",
            Self::Role => "Role Required",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn describe(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised when caller input is missing or malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were blank.
    #[error("missing required fields: {}", describe(.0))]
    MissingFields(Vec<Field>),

    /// A field was present but could not be interpreted.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The offending field.
        field: Field,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ValidationError {
    pub fn missing(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::MissingFields(fields.into_iter().collect())
    }

    pub fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    /// One `(field, message)` pair per offending field.
    #[must_use]
    pub fn messages(&self) -> Vec<(Field, String)> {
        match self {
            Self::MissingFields(fields) => fields
                .iter()
                .map(|field| (*field, field.required_message().to_string()))
                .collect(),
            Self::InvalidValue { field, reason } => vec![(*field, reason.clone())],
        }
    }
}

/// Fail with every blank field at once, in the order given.
///
/// # Errors
/// Returns [`ValidationError::MissingFields`] if any value is empty.
pub fn require(fields: &[(Field, &str)]) -> Result<(), ValidationError> {
    let missing: Vec<Field> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| *field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
