//! Ticket assignment (technician <-> ticket join) model and DTOs.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `ticket_assignees` row joined with the assignee's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketAssignee {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub is_primary: bool,
    pub assigned_at: Timestamp,
    pub assigned_by: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub work_notes: Option<String>,
    pub full_name: String,
    pub email: String,
}

/// DTO for inserting an assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketAssignee {
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub is_primary: bool,
    pub assigned_by: Option<DbId>,
    pub work_notes: Option<String>,
}
