//! User entity model and DTOs.

use helpdesk_core::roles::Role;
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    /// Raw role string; parse with [`User::role`].
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The parsed role, `None` if the stored value is unrecognised.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub role: String,
}
