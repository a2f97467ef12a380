//! User roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role a user acts under. New users are always students.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Stable name stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" | "student" => Ok(Self::Student),
            "Teacher" | "teacher" => Ok(Self::Teacher),
            "Admin" | "admin" => Ok(Self::Admin),
            _ => Err(format!("{s:?} is not a valid role")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_is_student() {
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn parses_stored_and_lowercase_names() {
        assert_eq!("Teacher".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("Boss".parse::<Role>().is_err());
    }

    #[test]
    fn display_matches_column_value() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }
}
