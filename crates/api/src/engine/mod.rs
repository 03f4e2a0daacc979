//! The ticket workflow engine.
//!
//! Every operation takes a [`Caller`] and a [`TicketStore`], asks the
//! permission evaluator in `helpdesk_core::access`, performs the mutation
//! through the store together with its activity entries, and reports the most
//! specific error on failure. Handlers are thin wrappers over these
//! functions.
//!
//! - [`tickets`] -- create, list, read, patch, delete
//! - [`status`] -- status and priority transitions
//! - [`assignment`] -- technician assignment
//! - [`comments`] -- ticket comments
//! - [`activity`] -- audit trail reads
//! - [`users`] -- role and activation administration
//! - [`sla`] -- resolution-window policies

use helpdesk_core::access::TicketAccess;
use helpdesk_core::error::CoreError;
use helpdesk_core::roles::Role;
use helpdesk_core::ticket::{TicketPriority, TicketStatus};
use helpdesk_core::types::DbId;
use helpdesk_db::models::ticket::Ticket;
use helpdesk_db::models::user::User;
use helpdesk_db::store::TicketStore;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

pub mod activity;
pub mod assignment;
pub mod comments;
pub mod sla;
pub mod status;
pub mod tickets;
pub mod users;

/// The identity an operation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    /// `None` for a role claim outside the known set.
    pub role: Option<Role>,
}

impl Caller {
    pub fn new(user_id: DbId, role: Option<Role>) -> Self {
        Self { user_id, role }
    }

    /// The caller id in the form the evaluator takes.
    pub fn id(&self) -> Option<DbId> {
        Some(self.user_id)
    }
}

impl From<&AuthUser> for Caller {
    fn from(user: &AuthUser) -> Self {
        Self::new(user.user_id, user.role())
    }
}

// ---------------------------------------------------------------------------
// Shared loaders
// ---------------------------------------------------------------------------

pub(crate) async fn load_ticket(store: &dyn TicketStore, id: DbId) -> AppResult<Ticket> {
    store
        .find_ticket(id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Ticket", id }.into())
}

pub(crate) async fn load_user(store: &dyn TicketStore, id: DbId) -> AppResult<User> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "User", id }.into())
}

/// Access context of a ticket, with assignees read from the join table.
pub(crate) async fn load_access(
    store: &dyn TicketStore,
    ticket: &Ticket,
) -> AppResult<TicketAccess> {
    let assignees = store.list_assignees(ticket.id).await?;
    Ok(ticket.access(assignees.iter().map(|a| a.user_id).collect()))
}

/// Stored status of a ticket. The column is check-constrained, so a parse
/// failure is an internal fault.
pub(crate) fn stored_status(ticket: &Ticket) -> Result<TicketStatus, CoreError> {
    ticket.status().map_err(CoreError::Internal)
}

pub(crate) fn stored_priority(ticket: &Ticket) -> Result<TicketPriority, CoreError> {
    ticket.priority().map_err(CoreError::Internal)
}
