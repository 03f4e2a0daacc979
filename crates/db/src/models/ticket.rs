//! Ticket entity model and DTOs.

use helpdesk_core::access::TicketAccess;
use helpdesk_core::ticket::{TicketPriority, TicketStatus};
use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub created_by: DbId,
    /// Primary assignee projection; the join table is authoritative.
    pub assigned_to: Option<DbId>,
    pub due_at: Option<Timestamp>,
    pub sla_breach: bool,
    pub resolved_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    /// Parsed status. Rows are constrained by `chk_tickets_status`, so a
    /// failure here means the schema and code disagree.
    pub fn status(&self) -> Result<TicketStatus, String> {
        TicketStatus::from_str_value(&self.status)
    }

    pub fn priority(&self) -> Result<TicketPriority, String> {
        TicketPriority::from_str_value(&self.priority)
    }

    /// Access context for the permission evaluator.
    pub fn access(&self, assignee_ids: Vec<DbId>) -> TicketAccess {
        TicketAccess::new(self.created_by, assignee_ids)
    }
}

/// DTO for creating a ticket. Status always starts as `new`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub created_by: DbId,
    pub due_at: Option<Timestamp>,
}

/// Patch for free-form ticket fields. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<Timestamp>,
}

/// A status write, applied only if the ticket is still in `expected_status`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub expected_status: String,
    pub new_status: String,
    pub resolved_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    /// When true, `sla_breach` is set; it is never cleared by a status write.
    pub latch_breach: bool,
}

/// Which tickets a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    All,
    /// Tickets with an assignment row for this user.
    AssignedTo(DbId),
    /// Tickets created by this user.
    CreatedBy(DbId),
}
