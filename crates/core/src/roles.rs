//! User roles.
//!
//! The string constants must match the `chk_users_role` check constraint in
//! `20260301000001_create_users.sql`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_TECHNICIAN: &str = "technician";
pub const ROLE_EMPLOYEE: &str = "employee";

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_TECHNICIAN, ROLE_EMPLOYEE];

/// The closed set of roles a user can hold.
///
/// Role strings coming from tokens or rows are parsed into this enum at the
/// boundary; anything unrecognised stays `None` and is denied everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Technician,
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Technician, Role::Employee];

    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_MANAGER => Ok(Self::Manager),
            ROLE_TECHNICIAN => Ok(Self::Technician),
            ROLE_EMPLOYEE => Ok(Self::Employee),
            _ => Err(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            )),
        }
    }

    /// Lenient parse for identity data: unknown or empty roles become `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str_value(s).ok()
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Manager => ROLE_MANAGER,
            Self::Technician => ROLE_TECHNICIAN,
            Self::Employee => ROLE_EMPLOYEE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
