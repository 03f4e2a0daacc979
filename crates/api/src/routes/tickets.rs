//! Route definitions for tickets and their sub-resources.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{activity, assignees, comments, tickets};
use crate::state::AppState;

/// Ticket routes mounted at `/tickets`.
///
/// ```text
/// GET    /                                  -> list_tickets
/// POST   /                                  -> create_ticket
/// GET    /{id}                              -> get_ticket
/// PATCH  /{id}                              -> update_ticket
/// DELETE /{id}                              -> delete_ticket
/// PUT    /{id}/status                       -> change_status
/// PUT    /{id}/priority                     -> change_priority
/// GET    /{id}/permissions                  -> ticket_permissions
/// GET    /{id}/assignees                    -> list_assignees
/// POST   /{id}/assignees                    -> assign
/// DELETE /{id}/assignees/{user_id}          -> unassign
/// PUT    /{id}/assignees/{user_id}/complete -> complete
/// GET    /{id}/comments                     -> list_comments
/// POST   /{id}/comments                     -> add_comment
/// GET    /{id}/activity-logs                -> list_for_ticket
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list_tickets).post(tickets::create_ticket))
        .route(
            "/{id}",
            get(tickets::get_ticket)
                .patch(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/{id}/status", put(tickets::change_status))
        .route("/{id}/priority", put(tickets::change_priority))
        .route("/{id}/permissions", get(tickets::ticket_permissions))
        .route(
            "/{id}/assignees",
            get(assignees::list_assignees).post(assignees::assign),
        )
        .route("/{id}/assignees/{user_id}", delete(assignees::unassign))
        .route("/{id}/assignees/{user_id}/complete", put(assignees::complete))
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route("/{id}/activity-logs", get(activity::list_for_ticket))
}
