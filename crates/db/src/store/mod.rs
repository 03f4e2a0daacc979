//! The data-access surface consumed by the workflow engine.
//!
//! [`TicketStore`] is record-typed: each method is one logical unit of work.
//! Every mutating method receives the [`NewActivityLog`] entries that
//! describe it and persists the mutation and the entries together, or
//! neither. Two implementations ship:
//!
//! - [`PgTicketStore`] -- PostgreSQL via the repositories, one transaction
//!   per method.
//! - [`MemoryTicketStore`] -- in-process state behind a single lock, used by
//!   tests and local tooling.

use async_trait::async_trait;
use helpdesk_core::types::DbId;

use crate::models::activity_log::{ActivityLog, NewActivityLog};
use crate::models::comment::{Comment, CreateComment};
use crate::models::sla_policy::SlaPolicy;
use crate::models::ticket::{CreateTicket, StatusChange, Ticket, TicketScope, UpdateTicket};
use crate::models::ticket_assignee::{CreateTicketAssignee, TicketAssignee};
use crate::models::user::{CreateUser, User};

mod memory;
mod postgres;

pub use memory::MemoryTicketStore;
pub use postgres::PgTicketStore;

/// Name of the `(ticket_id, user_id)` uniqueness constraint on assignments.
pub const UQ_TICKET_ASSIGNEE: &str = "uq_ticket_assignees_ticket_user";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`TicketStore`].
///
/// Constraint violations are classified so callers can map them without
/// inspecting backend-specific error codes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (SQLSTATE `23505`).
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A referenced row does not exist (SQLSTATE `23503`).
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Failure of a non-SQL backend.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some("23505") => return Self::UniqueViolation { constraint },
                Some("23503") => return Self::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        Self::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Verify the backend is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    // --- users ---

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Users ordered by name, optionally restricted to one role and to
    /// active accounts.
    async fn list_users(&self, role: Option<&str>, active_only: bool) -> StoreResult<Vec<User>>;

    async fn update_user_role(
        &self,
        id: DbId,
        role: &str,
        log: &NewActivityLog,
    ) -> StoreResult<Option<User>>;

    async fn set_user_active(
        &self,
        id: DbId,
        is_active: bool,
        log: &NewActivityLog,
    ) -> StoreResult<Option<User>>;

    // --- tickets ---

    async fn find_ticket(&self, id: DbId) -> StoreResult<Option<Ticket>>;

    /// Tickets in `scope`, newest first.
    async fn list_tickets(&self, scope: TicketScope) -> StoreResult<Vec<Ticket>>;

    /// Insert a ticket. The new ticket id is filled into `log` before it is
    /// written.
    async fn create_ticket(&self, input: &CreateTicket, log: &NewActivityLog)
        -> StoreResult<Ticket>;

    async fn update_ticket(
        &self,
        id: DbId,
        patch: &UpdateTicket,
        log: &NewActivityLog,
    ) -> StoreResult<Option<Ticket>>;

    /// Compare-and-set the status. Returns `None`, writing nothing, when the
    /// ticket is missing or no longer in `change.expected_status`.
    async fn change_ticket_status(
        &self,
        id: DbId,
        change: &StatusChange,
        logs: &[NewActivityLog],
    ) -> StoreResult<Option<Ticket>>;

    /// Compare-and-set the priority, with the same contract as
    /// [`TicketStore::change_ticket_status`].
    async fn change_ticket_priority(
        &self,
        id: DbId,
        expected_priority: &str,
        priority: &str,
        log: &NewActivityLog,
    ) -> StoreResult<Option<Ticket>>;

    /// Hard-delete a ticket with its assignments and comments. Activity
    /// entries survive. Returns `false`, writing nothing, if it did not exist.
    async fn delete_ticket(&self, id: DbId, log: &NewActivityLog) -> StoreResult<bool>;

    // --- assignees ---

    /// Assignments of a ticket: primary first, then `assigned_at`, then id.
    async fn list_assignees(&self, ticket_id: DbId) -> StoreResult<Vec<TicketAssignee>>;

    /// Assignments held by one user across all tickets, oldest first.
    async fn list_assignments_for_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Vec<TicketAssignee>>;

    async fn find_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<TicketAssignee>>;

    /// Insert an assignment. A primary insert demotes any existing primary.
    /// The `assigned_to` projection is recomputed. A duplicate pair fails
    /// with [`StoreError::UniqueViolation`] on [`UQ_TICKET_ASSIGNEE`].
    async fn insert_assignee(
        &self,
        input: &CreateTicketAssignee,
        log: &NewActivityLog,
    ) -> StoreResult<TicketAssignee>;

    /// Remove an assignment. Returns `false`, writing nothing, when there
    /// was no such row.
    async fn delete_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        log: &NewActivityLog,
    ) -> StoreResult<bool>;

    /// Stamp `completed_at` on an open assignment. Returns `None`, writing
    /// nothing, when there is no open assignment for the pair.
    async fn complete_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        work_notes: Option<&str>,
        log: &NewActivityLog,
    ) -> StoreResult<Option<TicketAssignee>>;

    // --- comments ---

    /// Comments on a ticket, oldest first.
    async fn list_comments(&self, ticket_id: DbId) -> StoreResult<Vec<Comment>>;

    /// Insert a comment. The comment id is filled into `log` as its target.
    async fn insert_comment(
        &self,
        input: &CreateComment,
        log: &NewActivityLog,
    ) -> StoreResult<Comment>;

    // --- activity (append-only) ---

    async fn record_activity(&self, entry: &NewActivityLog) -> StoreResult<ActivityLog>;

    /// A ticket's trail in write order.
    async fn list_activity_for_ticket(&self, ticket_id: DbId) -> StoreResult<Vec<ActivityLog>>;

    /// Latest `limit` entries across all tickets, newest first.
    async fn list_recent_activity(&self, limit: i64) -> StoreResult<Vec<ActivityLog>>;

    // --- SLA policies ---

    async fn list_sla_policies(&self) -> StoreResult<Vec<SlaPolicy>>;

    async fn find_sla_policy(&self, priority: &str) -> StoreResult<Option<SlaPolicy>>;

    async fn upsert_sla_policy(
        &self,
        priority: &str,
        resolution_hours: i32,
        log: &NewActivityLog,
    ) -> StoreResult<SlaPolicy>;
}
