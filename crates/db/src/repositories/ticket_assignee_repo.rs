//! Repository for the `ticket_assignees` join table.

use helpdesk_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::ticket_assignee::{CreateTicketAssignee, TicketAssignee};

/// Column list for assignment rows joined with `users u`. Every query
/// exposes the assignment rows under the alias `ta`.
const COLUMNS: &str = "ta.id, ta.ticket_id, ta.user_id, ta.is_primary, ta.assigned_at, \
                       ta.assigned_by, ta.completed_at, ta.work_notes, u.full_name, u.email";

/// Canonical listing order: primary first, then by assignment time.
const ORDER: &str = "ta.is_primary DESC, ta.assigned_at ASC, ta.id ASC";

pub struct TicketAssigneeRepo;

impl TicketAssigneeRepo {
    /// All assignments for a ticket, primary first.
    pub async fn list_for_ticket<'e>(
        executor: impl PgExecutor<'e>,
        ticket_id: DbId,
    ) -> Result<Vec<TicketAssignee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_assignees ta
             JOIN users u ON u.id = ta.user_id
             WHERE ta.ticket_id = $1
             ORDER BY {ORDER}"
        );
        sqlx::query_as::<_, TicketAssignee>(&query)
            .bind(ticket_id)
            .fetch_all(executor)
            .await
    }

    /// Every assignment a user holds, oldest first.
    pub async fn list_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Vec<TicketAssignee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_assignees ta
             JOIN users u ON u.id = ta.user_id
             WHERE ta.user_id = $1
             ORDER BY ta.assigned_at ASC, ta.id ASC"
        );
        sqlx::query_as::<_, TicketAssignee>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    pub async fn find<'e>(
        executor: impl PgExecutor<'e>,
        ticket_id: DbId,
        user_id: DbId,
    ) -> Result<Option<TicketAssignee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_assignees ta
             JOIN users u ON u.id = ta.user_id
             WHERE ta.ticket_id = $1 AND ta.user_id = $2"
        );
        sqlx::query_as::<_, TicketAssignee>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Insert an assignment row.
    ///
    /// A duplicate `(ticket_id, user_id)` fails with SQLSTATE 23505 on
    /// `uq_ticket_assignees_ticket_user`.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateTicketAssignee,
    ) -> Result<TicketAssignee, sqlx::Error> {
        let query = format!(
            "WITH ta AS (
                INSERT INTO ticket_assignees (ticket_id, user_id, is_primary, assigned_by, work_notes)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {COLUMNS} FROM ta JOIN users u ON u.id = ta.user_id"
        );
        sqlx::query_as::<_, TicketAssignee>(&query)
            .bind(input.ticket_id)
            .bind(input.user_id)
            .bind(input.is_primary)
            .bind(input.assigned_by)
            .bind(&input.work_notes)
            .fetch_one(executor)
            .await
    }

    /// Clear the primary flag on every assignment of a ticket.
    pub async fn clear_primary<'e>(
        executor: impl PgExecutor<'e>,
        ticket_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ticket_assignees SET is_primary = false
             WHERE ticket_id = $1 AND is_primary",
        )
        .bind(ticket_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remove an assignment. Returns `true` if a row was removed.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        ticket_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM ticket_assignees WHERE ticket_id = $1 AND user_id = $2")
                .bind(ticket_id)
                .bind(user_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp `completed_at` on an open assignment, optionally replacing its
    /// work notes. Returns `None` if there is no open assignment.
    pub async fn complete<'e>(
        executor: impl PgExecutor<'e>,
        ticket_id: DbId,
        user_id: DbId,
        work_notes: Option<&str>,
    ) -> Result<Option<TicketAssignee>, sqlx::Error> {
        let query = format!(
            "WITH ta AS (
                UPDATE ticket_assignees SET
                    completed_at = NOW(),
                    work_notes = COALESCE($3, work_notes)
                WHERE ticket_id = $1 AND user_id = $2 AND completed_at IS NULL
                RETURNING *
             )
             SELECT {COLUMNS} FROM ta JOIN users u ON u.id = ta.user_id"
        );
        sqlx::query_as::<_, TicketAssignee>(&query)
            .bind(ticket_id)
            .bind(user_id)
            .bind(work_notes)
            .fetch_optional(executor)
            .await
    }
}
