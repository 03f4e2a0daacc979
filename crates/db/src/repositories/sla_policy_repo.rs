//! Repository for the `sla_policies` table.

use sqlx::{PgExecutor, PgPool};

use crate::models::sla_policy::SlaPolicy;

const COLUMNS: &str = "priority, resolution_hours, updated_at";

pub struct SlaPolicyRepo;

impl SlaPolicyRepo {
    /// All policies, most urgent first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SlaPolicy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sla_policies ORDER BY resolution_hours ASC");
        sqlx::query_as::<_, SlaPolicy>(&query).fetch_all(pool).await
    }

    pub async fn find<'e>(
        executor: impl PgExecutor<'e>,
        priority: &str,
    ) -> Result<Option<SlaPolicy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sla_policies WHERE priority = $1");
        sqlx::query_as::<_, SlaPolicy>(&query)
            .bind(priority)
            .fetch_optional(executor)
            .await
    }

    /// Insert or replace the window for a priority.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        priority: &str,
        resolution_hours: i32,
    ) -> Result<SlaPolicy, sqlx::Error> {
        let query = format!(
            "INSERT INTO sla_policies (priority, resolution_hours)
             VALUES ($1, $2)
             ON CONFLICT (priority) DO UPDATE
                SET resolution_hours = EXCLUDED.resolution_hours,
                    updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SlaPolicy>(&query)
            .bind(priority)
            .bind(resolution_hours)
            .fetch_one(executor)
            .await
    }
}
