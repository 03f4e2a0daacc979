//! SLA resolution-window policy model.

use helpdesk_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Resolution window for one priority level.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SlaPolicy {
    pub priority: String,
    pub resolution_hours: i32,
    pub updated_at: Timestamp,
}
