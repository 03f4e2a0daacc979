//! Repository for the `users` table.

use helpdesk_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, email, role, is_active, created_at, updated_at";

/// Provides CRUD operations for users. There is no delete: accounts are
/// soft-disabled via [`UserRepo::set_active`].
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (full_name, email, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List users ordered by name, optionally filtered by role and activity.
    pub async fn list(
        pool: &PgPool,
        role: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR role = $1)
               AND (NOT $2 OR is_active)
             ORDER BY full_name ASC, id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    /// Change a user's role. Returns `None` if no row with `id` exists.
    pub async fn update_role<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        role: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET role = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(executor)
            .await
    }

    /// Enable or soft-disable a user. Returns `None` if no row with `id` exists.
    pub async fn set_active<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET is_active = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(executor)
            .await
    }
}
