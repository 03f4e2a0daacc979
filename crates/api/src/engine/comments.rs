//! Ticket comments.

use helpdesk_core::access::{can_comment, can_view, require_on_ticket};
use helpdesk_core::activity::{action_types, target_types};
use helpdesk_core::assignment::validate_comment;
use helpdesk_core::permissions::Permission;
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::comment::{Comment, CreateComment};
use helpdesk_db::store::TicketStore;
use serde_json::json;

use super::{load_access, load_ticket, Caller};
use crate::error::AppResult;

pub async fn list_comments(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
) -> AppResult<Vec<Comment>> {
    let ticket = load_ticket(store, ticket_id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_view(caller.role, &access, caller.id()),
        Permission::ViewAllTickets,
        ticket.id,
    )?;
    Ok(store.list_comments(ticket.id).await?)
}

pub async fn add_comment(
    store: &dyn TicketStore,
    caller: &Caller,
    ticket_id: DbId,
    content: String,
) -> AppResult<Comment> {
    let ticket = load_ticket(store, ticket_id).await?;
    let access = load_access(store, &ticket).await?;
    require_on_ticket(
        can_comment(caller.role, &access, caller.id()),
        Permission::AddComment,
        ticket.id,
    )?;
    validate_comment(&content)?;

    // Target id is the new comment's, filled in by the store.
    let log = NewActivityLog::on_ticket_target(
        caller.user_id,
        ticket.id,
        action_types::COMMENT_ADDED,
        target_types::COMMENT,
        0,
        json!({ "length": content.chars().count() }),
    );
    let comment = store
        .insert_comment(
            &CreateComment {
                ticket_id: ticket.id,
                user_id: caller.user_id,
                content,
            },
            &log,
        )
        .await?;

    tracing::info!(
        ticket_id = ticket.id,
        comment_id = comment.id,
        user_id = caller.user_id,
        "Comment added"
    );
    Ok(comment)
}
