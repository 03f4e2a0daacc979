//! Audit trail reads. Entries are written by the operations they describe;
//! nothing here mutates the log.

use helpdesk_core::access::{can_view, can_view_all, require, require_on_ticket};
use helpdesk_core::activity::{clamp_recent_limit, render_message};
use helpdesk_core::permissions::Permission;
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity_log::ActivityLog;
use helpdesk_db::store::TicketStore;
use serde::Serialize;

use super::{load_access, load_ticket, Caller};
use crate::error::AppResult;

/// A stored entry with its display sentence.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub log: ActivityLog,
    pub message: String,
}

impl From<ActivityLog> for ActivityEntry {
    fn from(log: ActivityLog) -> Self {
        let message = render_message(&log.action, &log.details);
        Self { log, message }
    }
}

/// A ticket's trail in the order it was written.
pub async fn list_for_ticket(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
) -> AppResult<Vec<ActivityEntry>> {
    let ticket = load_ticket(store, ticket_id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_view(caller.role, &access, caller.id()),
        Permission::ViewAllTickets,
        ticket.id,
    )?;

    let logs = store.list_activity_for_ticket(ticket.id).await?;
    Ok(logs.into_iter().map(ActivityEntry::from).collect())
}

/// Latest entries across all tickets, newest first.
///
/// `limit` is clamped to `1..=100`; `default_limit` applies when it is
/// absent.
pub async fn list_recent(
    store: &dyn TicketStore,
    caller: &Caller,
    limit: Option<i64>,
    default_limit: i64,
) -> AppResult<Vec<ActivityEntry>> {
    require(can_view_all(caller.role), Permission::ViewAllTickets)?;

    let limit = clamp_recent_limit(limit, default_limit);
    let logs = store.list_recent_activity(limit).await?;
    Ok(logs.into_iter().map(ActivityEntry::from).collect())
}
