//! Technician assignment.
//!
//! The `ticket_assignees` join table is the only source of truth for who is
//! assigned; `tickets.assigned_to` is kept by the store as a projection of
//! the primary assignee. Duplicate pairs are rejected by the store's unique
//! constraint, never by a read-before-write here.

use helpdesk_core::access::{
    can_assign, can_complete_assignment, can_view, require, require_on_ticket,
};
use helpdesk_core::activity::{
    action_types, target_types, technician_assign_details, technician_details,
};
use helpdesk_core::assignment::{validate_assignee, validate_work_notes};
use helpdesk_core::error::CoreError;
use helpdesk_core::permissions::Permission;
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::ticket_assignee::{CreateTicketAssignee, TicketAssignee};
use helpdesk_db::store::TicketStore;

use super::{load_access, load_ticket, load_user, Caller};
use crate::error::{AppError, AppResult};

const ASSIGNEE_ENTITY: &str = "Ticket assignee";

/// Body of an assignment request.
#[derive(Debug, Clone, Default)]
pub struct NewAssignment {
    pub user_id: DbId,
    pub is_primary: bool,
    pub work_notes: Option<String>,
}

fn assignee_not_found(ticket_id: DbId, user_id: DbId) -> AppError {
    tracing::debug!(ticket_id, user_id, "No assignment for pair");
    CoreError::NotFound {
        entity: ASSIGNEE_ENTITY,
        id: user_id,
    }
    .into()
}

/// Assignees of a ticket, primary first.
pub async fn list_assignees(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
) -> AppResult<Vec<TicketAssignee>> {
    let ticket = load_ticket(store, ticket_id).await?;
    let assignees = store.list_assignees(ticket.id).await?;
    let access = ticket.access(assignees.iter().map(|a| a.user_id).collect());
    require_on_ticket(
        can_view(caller.role, &access, caller.id()),
        Permission::ViewAllTickets,
        ticket_id,
    )?;
    Ok(assignees)
}

/// Attach a technician to a ticket.
///
/// A primary assignment demotes the current primary; the audit entry then
/// records `demoted_user_id`.
pub async fn assign(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
    input: NewAssignment,
) -> AppResult<TicketAssignee> {
    require(can_assign(caller.role), Permission::AssignTicket)?;

    let ticket = load_ticket(store, ticket_id).await?;
    let technician = load_user(store, input.user_id).await?;
    validate_assignee(technician.id, &technician.role, technician.is_active)?;
    validate_work_notes(input.work_notes.as_deref())?;

    let demoted = if input.is_primary {
        store
            .list_assignees(ticket.id)
            .await?
            .into_iter()
            .find(|a| a.is_primary && a.user_id != technician.id)
            .map(|a| a.user_id)
    } else {
        None
    };

    let log = NewActivityLog::on_ticket_target(
        caller.user_id,
        ticket.id,
        action_types::TECHNICIAN_ASSIGN,
        target_types::USER,
        technician.id,
        technician_assign_details(
            technician.id,
            &technician.full_name,
            input.is_primary,
            demoted,
        ),
    );
    let create = CreateTicketAssignee {
        ticket_id: ticket.id,
        user_id: technician.id,
        is_primary: input.is_primary,
        assigned_by: Some(caller.user_id),
        work_notes: input.work_notes,
    };

    let assignee = store.insert_assignee(&create, &log).await.map_err(|e| {
        if e.is_unique_violation() {
            AppError::Core(CoreError::Conflict(format!(
                "{} is already assigned to ticket {}",
                technician.full_name, ticket.id
            )))
        } else {
            e.into()
        }
    })?;

    tracing::info!(
        ticket_id = ticket.id,
        technician_id = technician.id,
        assigned_by = caller.user_id,
        is_primary = input.is_primary,
        demoted_user_id = ?demoted,
        "Technician assigned"
    );
    Ok(assignee)
}

/// Detach a technician. A pair that is not assigned is `NotFound` and
/// leaves no audit entry.
pub async fn unassign(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
    user_id: DbId,
) -> AppResult<()> {
    require(can_assign(caller.role), Permission::AssignTicket)?;

    let ticket = load_ticket(store, ticket_id).await?;
    let assignee = store
        .find_assignee(ticket.id, user_id)
        .await?
        .ok_or_else(|| assignee_not_found(ticket.id, user_id))?;

    let log = NewActivityLog::on_ticket_target(
        caller.user_id,
        ticket.id,
        action_types::TECHNICIAN_REMOVE,
        target_types::USER,
        user_id,
        technician_details(user_id, &assignee.full_name),
    );
    if !store.delete_assignee(ticket.id, user_id, &log).await? {
        // Removed between the read and the delete.
        return Err(assignee_not_found(ticket.id, user_id));
    }

    tracing::info!(
        ticket_id = ticket.id,
        technician_id = user_id,
        removed_by = caller.user_id,
        "Technician unassigned"
    );
    Ok(())
}

/// Mark an assignment's work as done. The assignee may complete their own
/// assignment; admins and managers may complete on anyone's behalf.
pub async fn complete_assignment(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
    user_id: DbId,
    work_notes: Option<String>,
) -> AppResult<TicketAssignee> {
    let ticket = load_ticket(store, ticket_id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_view(caller.role, &access, caller.id()),
        Permission::ViewAllTickets,
        ticket.id,
    )?;
    validate_work_notes(work_notes.as_deref())?;

    let assignee = store
        .find_assignee(ticket.id, user_id)
        .await?
        .ok_or_else(|| assignee_not_found(ticket.id, user_id))?;
    require(
        can_complete_assignment(caller.role, assignee.user_id, caller.id()),
        Permission::UpdateAnyTicket,
    )?;

    let already_done = || -> AppError {
        CoreError::Conflict(format!(
            "Assignment of user {user_id} on ticket {ticket_id} is already completed"
        ))
        .into()
    };
    if assignee.completed_at.is_some() {
        return Err(already_done());
    }

    let log = NewActivityLog::on_ticket_target(
        caller.user_id,
        ticket.id,
        action_types::TECHNICIAN_COMPLETE,
        target_types::USER,
        user_id,
        technician_details(user_id, &assignee.full_name),
    );
    let completed = store
        .complete_assignee(ticket.id, user_id, work_notes.as_deref(), &log)
        .await?
        .ok_or_else(already_done)?;

    tracing::info!(
        ticket_id = ticket.id,
        technician_id = user_id,
        completed_by = caller.user_id,
        "Assignment completed"
    );
    Ok(completed)
}
