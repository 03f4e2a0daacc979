//! Ticket lifecycle: create, list, read, patch, delete.

use helpdesk_core::access::{
    can_configure_sla, can_create, can_delete, can_update, can_view, require, require_on_ticket,
    ticket_permissions, TicketPermissions,
};
use helpdesk_core::activity::action_types;
use helpdesk_core::error::CoreError;
use helpdesk_core::permissions::{has_permission, Permission};
use helpdesk_core::sla::{self, SlaIndicator};
use helpdesk_core::ticket::{validate_description, validate_title, TicketPriority};
use helpdesk_core::types::{DbId, Timestamp};
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::ticket::{CreateTicket, Ticket, TicketScope, UpdateTicket};
use helpdesk_db::models::ticket_assignee::TicketAssignee;
use helpdesk_db::store::TicketStore;
use serde::Serialize;
use serde_json::json;

use super::{load_access, load_ticket, stored_status, Caller};
use crate::error::AppResult;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A ticket with its SLA indicator at read time.
#[derive(Debug, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla: Option<SlaIndicator>,
}

/// A single ticket with everything a detail page needs.
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla: Option<SlaIndicator>,
    pub assignees: Vec<TicketAssignee>,
    pub permissions: TicketPermissions,
}

fn sla_indicator(ticket: &Ticket, now: Timestamp) -> AppResult<Option<SlaIndicator>> {
    let status = stored_status(ticket)?;
    Ok(sla::evaluate(ticket.due_at, status, ticket.sla_breach, now))
}

fn view(ticket: Ticket, now: Timestamp) -> AppResult<TicketView> {
    let sla = sla_indicator(&ticket, now)?;
    Ok(TicketView { ticket, sla })
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    /// Explicit deadline; derived from the priority's SLA policy when absent.
    pub due_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub async fn create_ticket(
    store: &dyn TicketStore,
    caller: &Caller,
    input: NewTicket,
    now: Timestamp,
) -> AppResult<TicketView> {
    require(can_create(caller.role), Permission::CreateTicket)?;
    validate_title(&input.title)?;
    let description = input.description.unwrap_or_default();
    validate_description(&description)?;

    let priority = input.priority.unwrap_or_default();
    let due_at = match input.due_at {
        Some(due_at) => due_at,
        None => {
            let hours = store
                .find_sla_policy(priority.as_str())
                .await?
                .map(|p| p.resolution_hours)
                .unwrap_or_else(|| sla::default_resolution_hours(priority));
            sla::compute_due_at(now, hours)
        }
    };

    let create = CreateTicket {
        title: input.title.trim().to_string(),
        description,
        priority: priority.as_str().to_string(),
        created_by: caller.user_id,
        due_at: Some(due_at),
    };
    // The store fills in the ticket id once the row exists.
    let log = NewActivityLog::for_ticket(
        caller.user_id,
        0,
        action_types::TICKET_CREATED,
        json!({ "title": create.title, "priority": create.priority }),
    );
    let ticket = store.create_ticket(&create, &log).await?;

    tracing::info!(
        ticket_id = ticket.id,
        user_id = caller.user_id,
        priority = %ticket.priority,
        "Ticket created"
    );
    view(ticket, now)
}

/// Tickets the caller may see: everything with `VIEW_ALL_TICKETS`, else the
/// tickets assigned to them, else the tickets they created.
pub async fn list_tickets(
    store: &dyn TicketStore,
    caller: &Caller,
    now: Timestamp,
) -> AppResult<Vec<TicketView>> {
    let scope = if has_permission(caller.role, Permission::ViewAllTickets) {
        TicketScope::All
    } else if has_permission(caller.role, Permission::ViewAssignedTickets) {
        TicketScope::AssignedTo(caller.user_id)
    } else if has_permission(caller.role, Permission::ViewOwnTickets) {
        TicketScope::CreatedBy(caller.user_id)
    } else {
        return Err(CoreError::Forbidden(format!(
            "Missing permission {}",
            Permission::ViewAllTickets
        ))
        .into());
    };

    store
        .list_tickets(scope)
        .await?
        .into_iter()
        .map(|t| view(t, now))
        .collect()
}

pub async fn get_ticket(
    store: &dyn TicketStore,
    caller: &Caller,
    id: DbId,
    now: Timestamp,
) -> AppResult<TicketDetail> {
    let ticket = load_ticket(store, id).await?;
    let assignees = store.list_assignees(id).await?;
    let access = ticket.access(assignees.iter().map(|a| a.user_id).collect());
    require_on_ticket(
        can_view(caller.role, &access, caller.id()),
        Permission::ViewAllTickets,
        id,
    )?;

    let sla = sla_indicator(&ticket, now)?;
    let permissions = ticket_permissions(caller.role, &access, caller.id());
    Ok(TicketDetail {
        ticket,
        sla,
        assignees,
        permissions,
    })
}

/// Per-ticket decision summary for UI layers. Computed for any caller; a
/// caller who may not view the ticket simply gets `false` everywhere.
pub async fn permissions_for_ticket(
    store: &dyn TicketStore,
    caller: &Caller,
    id: DbId,
) -> AppResult<TicketPermissions> {
    let ticket = load_ticket(store, id).await?;
    let access = load_access(store, &ticket).await?;
    Ok(ticket_permissions(caller.role, &access, caller.id()))
}

/// Patch free-form fields. Moving the deadline also needs `CONFIGURE_SLA`.
/// A patch that changes nothing writes nothing.
pub async fn update_ticket(
    store: &dyn TicketStore,
    caller: &Caller,
    id: DbId,
    patch: TicketPatch,
) -> AppResult<Ticket> {
    let ticket = load_ticket(store, id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_update(caller.role, &access, caller.id()),
        Permission::UpdateAnyTicket,
        id,
    )?;
    if patch.due_at.is_some() {
        require(can_configure_sla(caller.role), Permission::ConfigureSla)?;
    }

    let title = patch.title.map(|t| t.trim().to_string());
    if let Some(title) = &title {
        validate_title(title)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }

    let update = UpdateTicket {
        title: title.filter(|t| *t != ticket.title),
        description: patch.description.filter(|d| *d != ticket.description),
        due_at: patch.due_at.filter(|d| Some(*d) != ticket.due_at),
    };
    let mut fields = Vec::new();
    if update.title.is_some() {
        fields.push("title");
    }
    if update.description.is_some() {
        fields.push("description");
    }
    if update.due_at.is_some() {
        fields.push("due_at");
    }
    if fields.is_empty() {
        return Ok(ticket);
    }

    let log = NewActivityLog::for_ticket(
        caller.user_id,
        id,
        action_types::TICKET_UPDATED,
        json!({ "fields": fields }),
    );
    let updated = store
        .update_ticket(id, &update, &log)
        .await?
        .ok_or(CoreError::NotFound { entity: "Ticket", id })?;

    tracing::info!(ticket_id = id, user_id = caller.user_id, ?fields, "Ticket updated");
    Ok(updated)
}

/// Hard delete. The activity trail of the ticket is kept.
pub async fn delete_ticket(store: &dyn TicketStore, caller: &Caller, id: DbId) -> AppResult<()> {
    require(can_delete(caller.role), Permission::DeleteTicket)?;
    let ticket = load_ticket(store, id).await?;

    let log = NewActivityLog::for_ticket(
        caller.user_id,
        id,
        action_types::TICKET_DELETED,
        json!({ "title": ticket.title }),
    );
    if !store.delete_ticket(id, &log).await? {
        return Err(CoreError::NotFound { entity: "Ticket", id }.into());
    }

    tracing::info!(ticket_id = id, user_id = caller.user_id, "Ticket deleted");
    Ok(())
}
