//! Repository for the `comments` table.

use helpdesk_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::comment::{Comment, CreateComment};

const COLUMNS: &str = "id, ticket_id, user_id, content, created_at";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateComment,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (ticket_id, user_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.ticket_id)
            .bind(input.user_id)
            .bind(&input.content)
            .fetch_one(executor)
            .await
    }

    /// Comments on a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE ticket_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
