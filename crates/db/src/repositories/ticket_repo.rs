//! Repository for the `tickets` table.

use helpdesk_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::ticket::{CreateTicket, StatusChange, Ticket, UpdateTicket};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, priority, status, created_by, assigned_to, \
                       due_at, sla_breach, resolved_at, closed_at, created_at, updated_at";

/// Provides CRUD operations for tickets.
///
/// Status and priority are only written through the compare-and-set
/// methods, so a concurrent writer cannot be silently overwritten.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new ticket in status `new`, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateTicket,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets (title, description, priority, created_by, due_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(input.created_by)
            .bind(input.due_at)
            .fetch_one(executor)
            .await
    }

    /// Find a ticket by ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every ticket, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Ticket>(&query).fetch_all(pool).await
    }

    /// List tickets the user has an assignment row on, newest first.
    pub async fn list_assigned_to(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE id IN (SELECT ticket_id FROM ticket_assignees WHERE user_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List tickets created by the user, newest first.
    pub async fn list_created_by(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE created_by = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update free-form fields. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_at = COALESCE($4, due_at),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_at)
            .fetch_optional(executor)
            .await
    }

    /// Write a new status if the ticket is still in `change.expected_status`.
    ///
    /// Returns `None` if the ticket is gone or its status moved underneath us.
    pub async fn change_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        change: &StatusChange,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                status = $3,
                resolved_at = $4,
                closed_at = $5,
                sla_breach = sla_breach OR $6,
                updated_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&change.expected_status)
            .bind(&change.new_status)
            .bind(change.resolved_at)
            .bind(change.closed_at)
            .bind(change.latch_breach)
            .fetch_optional(executor)
            .await
    }

    /// Write a new priority if the ticket still has `expected_priority`.
    pub async fn change_priority<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expected_priority: &str,
        priority: &str,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET priority = $3, updated_at = NOW()
             WHERE id = $1 AND priority = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(expected_priority)
            .bind(priority)
            .fetch_optional(executor)
            .await
    }

    /// Recompute the `assigned_to` projection from the primary assignment row.
    pub async fn sync_assigned_to<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tickets SET assigned_to = (
                SELECT user_id FROM ticket_assignees
                WHERE ticket_id = $1 AND is_primary
                ORDER BY assigned_at ASC, id ASC
                LIMIT 1
             )
             WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Hard-delete a ticket. Assignments and comments cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
