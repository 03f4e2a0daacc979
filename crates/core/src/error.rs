use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The target user does not hold the role an operation requires
    /// (e.g. assigning a non-technician to a ticket).
    #[error("User {user_id} has role '{role}', expected 'technician'")]
    InvalidRole { user_id: DbId, role: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// No caller identity could be established.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but lacks the required permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
