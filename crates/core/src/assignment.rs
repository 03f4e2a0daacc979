//! Assignment eligibility rules.
//!
//! Uniqueness of a `(ticket, technician)` pair is deliberately absent here:
//! it is the store's `uq_ticket_assignees_ticket_user` constraint, and a
//! violation of it is the one canonical "already assigned" signal.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Maximum length of an assignment's work notes.
pub const MAX_WORK_NOTES_LENGTH: usize = 5_000;

/// Maximum length of a comment body.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// The only role that may be attached to a ticket as an assignee.
pub const ASSIGNABLE_ROLE: Role = Role::Technician;

/// Check that the target user may be assigned to a ticket.
///
/// `role` is the raw stored role string; anything other than `technician`
/// (including unrecognised values) is an [`CoreError::InvalidRole`].
pub fn validate_assignee(user_id: DbId, role: &str, is_active: bool) -> Result<(), CoreError> {
    if Role::parse(role) != Some(ASSIGNABLE_ROLE) {
        return Err(CoreError::InvalidRole {
            user_id,
            role: role.to_string(),
        });
    }
    if !is_active {
        return Err(CoreError::Validation(format!(
            "User {user_id} is deactivated and cannot be assigned"
        )));
    }
    Ok(())
}

pub fn validate_work_notes(notes: Option<&str>) -> Result<(), CoreError> {
    match notes {
        Some(n) if n.chars().count() > MAX_WORK_NOTES_LENGTH => Err(CoreError::Validation(
            format!("work_notes exceeds maximum length of {MAX_WORK_NOTES_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

pub fn validate_comment(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}
