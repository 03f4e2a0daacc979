//! Ticket state machine: status and priority transitions.
//!
//! Any status may be written by a caller passing the status gate, except
//! that leaving `closed` needs `REOPEN_TICKET`. Writes are compare-and-set
//! against the status the decision was made on; losing that race is a
//! conflict rather than a silent overwrite.

use helpdesk_core::access::{
    can_change_priority, can_change_status, can_transition, require, require_on_ticket,
};
use helpdesk_core::activity::{action_types, priority_changed_details, status_changed_details};
use helpdesk_core::error::CoreError;
use helpdesk_core::permissions::Permission;
use helpdesk_core::sla;
use helpdesk_core::ticket::{TicketPriority, TicketStatus};
use helpdesk_core::types::{DbId, Timestamp};
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::ticket::{StatusChange, Ticket};
use helpdesk_db::store::TicketStore;
use serde_json::json;

use super::{load_access, load_ticket, stored_priority, stored_status, Caller};
use crate::error::AppResult;

fn concurrent_change(id: DbId) -> CoreError {
    CoreError::Conflict(format!(
        "Ticket {id} was modified concurrently; reload and retry"
    ))
}

/// Timestamps and breach latch for entering `to`.
///
/// `resolved_at` is stamped on entering `resolved` and survives into
/// `closed`; `closed_at` is stamped on entering `closed`. Re-opening clears
/// both. A ticket resolved or closed past its deadline latches `sla_breach`.
fn plan_status_change(
    ticket: &Ticket,
    from: TicketStatus,
    to: TicketStatus,
    now: Timestamp,
) -> StatusChange {
    let (resolved_at, closed_at) = match to {
        TicketStatus::Resolved => (Some(now), None),
        TicketStatus::Closed => (ticket.resolved_at.or(Some(now)), Some(now)),
        _ => (None, None),
    };
    StatusChange {
        expected_status: from.as_str().to_string(),
        new_status: to.as_str().to_string(),
        resolved_at,
        closed_at,
        latch_breach: to.suppresses_sla() && sla::is_overdue(ticket.due_at, now),
    }
}

/// Move a ticket to `to`, appending `status_changed` and, on entering
/// `resolved` or `closed`, `ticket_resolved` / `ticket_closed`.
///
/// Writing the current status again returns the ticket unchanged and logs
/// nothing.
pub async fn change_status(
    store: &dyn TicketStore,
    caller: &Caller,
    id: DbId,
    to: TicketStatus,
    now: Timestamp,
) -> AppResult<Ticket> {
    let ticket = load_ticket(store, id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_change_status(caller.role, &access, caller.id()),
        Permission::UpdateTicketStatus,
        id,
    )?;

    let from = stored_status(&ticket)?;
    if from == to {
        return Ok(ticket);
    }
    require(
        can_transition(caller.role, from, to),
        Permission::ReopenTicket,
    )?;
    if !from.is_standard_transition(to) {
        tracing::debug!(ticket_id = id, %from, %to, "Off-lifecycle status transition");
    }

    let change = plan_status_change(&ticket, from, to, now);
    let mut logs = vec![NewActivityLog::for_ticket(
        caller.user_id,
        id,
        action_types::STATUS_CHANGED,
        status_changed_details(from.as_str(), to.as_str()),
    )];
    if let Some(action) = to.entry_action() {
        logs.push(NewActivityLog::for_ticket(
            caller.user_id,
            id,
            action,
            json!({ "status": to.as_str() }),
        ));
    }

    let updated = store
        .change_ticket_status(id, &change, &logs)
        .await?
        .ok_or_else(|| concurrent_change(id))?;

    tracing::info!(
        ticket_id = id,
        user_id = caller.user_id,
        %from,
        %to,
        breach_latched = change.latch_breach,
        "Ticket status changed"
    );
    Ok(updated)
}

/// Change a ticket's priority behind the same gate as status, appending
/// `priority_changed`. The SLA deadline is left as it is.
pub async fn change_priority(
    store: &dyn TicketStore,
    caller: &Caller,
    id: DbId,
    to: TicketPriority,
) -> AppResult<Ticket> {
    let ticket = load_ticket(store, id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_change_priority(caller.role, &access, caller.id()),
        Permission::UpdateTicketPriority,
        id,
    )?;

    let from = stored_priority(&ticket)?;
    if from == to {
        return Ok(ticket);
    }

    let log = NewActivityLog::for_ticket(
        caller.user_id,
        id,
        action_types::PRIORITY_CHANGED,
        priority_changed_details(from.as_str(), to.as_str()),
    );
    let updated = store
        .change_ticket_priority(id, from.as_str(), to.as_str(), &log)
        .await?
        .ok_or_else(|| concurrent_change(id))?;

    tracing::info!(ticket_id = id, user_id = caller.user_id, %from, %to, "Ticket priority changed");
    Ok(updated)
}
