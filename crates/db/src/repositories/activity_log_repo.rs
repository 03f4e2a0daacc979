//! Repository for the `activity_logs` table.
//!
//! Append-only: there are no update or delete methods, and the table's
//! `trg_activity_logs_append_only` trigger rejects them at the database.

use helpdesk_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::activity_log::{ActivityLog, NewActivityLog};

const COLUMNS: &str = "id, user_id, ticket_id, action, target_type, target_id, details, created_at";

pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append one entry, returning the stored row.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        entry: &NewActivityLog,
    ) -> Result<ActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_logs (user_id, ticket_id, action, target_type, target_id, details)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(entry.user_id)
            .bind(entry.ticket_id)
            .bind(&entry.action)
            .bind(&entry.target_type)
            .bind(entry.target_id)
            .bind(&entry.details)
            .fetch_one(executor)
            .await
    }

    /// Full trail of a ticket in chronological order.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_logs
             WHERE ticket_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Most recent entries across all tickets, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_logs
             ORDER BY created_at DESC, id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
