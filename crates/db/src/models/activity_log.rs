//! Activity log entity models and DTOs.
//!
//! Activity logs are immutable: there is no `updated_at` and no patch DTO.

use helpdesk_core::activity::target_types;
use helpdesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Activity log entity
// ---------------------------------------------------------------------------

/// A single activity log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLog {
    pub id: DbId,
    /// The acting user.
    pub user_id: DbId,
    pub ticket_id: Option<DbId>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// An entry to append. Mutating store methods take these and write them in
/// the same unit of work as the mutation they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityLog {
    pub user_id: DbId,
    pub ticket_id: Option<DbId>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<DbId>,
    pub details: serde_json::Value,
}

impl NewActivityLog {
    /// An entry whose target is the ticket itself.
    pub fn for_ticket(
        user_id: DbId,
        ticket_id: DbId,
        action: &str,
        details: serde_json::Value,
    ) -> Self {
        Self {
            user_id,
            ticket_id: Some(ticket_id),
            action: action.to_string(),
            target_type: Some(target_types::TICKET.to_string()),
            target_id: Some(ticket_id),
            details,
        }
    }

    /// An entry on a ticket whose target is some other record (a user, a
    /// comment).
    pub fn on_ticket_target(
        user_id: DbId,
        ticket_id: DbId,
        action: &str,
        target_type: &str,
        target_id: DbId,
        details: serde_json::Value,
    ) -> Self {
        Self {
            user_id,
            ticket_id: Some(ticket_id),
            action: action.to_string(),
            target_type: Some(target_type.to_string()),
            target_id: Some(target_id),
            details,
        }
    }

    /// An entry not tied to any ticket (user administration, SLA policy).
    pub fn standalone(
        user_id: DbId,
        action: &str,
        target_type: &str,
        target_id: Option<DbId>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            user_id,
            ticket_id: None,
            action: action.to_string(),
            target_type: Some(target_type.to_string()),
            target_id,
            details,
        }
    }

    /// Point the entry at a record id only known once the store inserts it.
    pub fn with_ticket_id(mut self, ticket_id: DbId) -> Self {
        self.ticket_id = Some(ticket_id);
        if self.target_type.as_deref() == Some(target_types::TICKET) {
            self.target_id = Some(ticket_id);
        }
        self
    }

    pub fn with_target_id(mut self, target_id: DbId) -> Self {
        self.target_id = Some(target_id);
        self
    }
}
