//! Ticket comment model and DTOs. Comments are append-only.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub ticket_id: DbId,
    pub user_id: DbId,
    pub content: String,
}
