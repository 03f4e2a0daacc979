//! PostgreSQL-backed [`TicketStore`].

use async_trait::async_trait;
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity_log::{ActivityLog, NewActivityLog};
use crate::models::comment::{Comment, CreateComment};
use crate::models::sla_policy::SlaPolicy;
use crate::models::ticket::{CreateTicket, StatusChange, Ticket, TicketScope, UpdateTicket};
use crate::models::ticket_assignee::{CreateTicketAssignee, TicketAssignee};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    ActivityLogRepo, CommentRepo, SlaPolicyRepo, TicketAssigneeRepo, TicketRepo, UserRepo,
};

use super::{StoreResult, TicketStore};

/// Runs each mutating method in its own transaction. Returning early
/// without `commit` drops the transaction, which rolls it back.
#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_users(&self, role: Option<&str>, active_only: bool) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list(&self.pool, role, active_only).await?)
    }

    async fn update_user_role(
        &self,
        id: DbId,
        role: &str,
        log: &NewActivityLog,
    ) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await?;
        let Some(user) = UserRepo::update_role(&mut *tx, id, role).await? else {
            return Ok(None);
        };
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(Some(user))
    }

    async fn set_user_active(
        &self,
        id: DbId,
        is_active: bool,
        log: &NewActivityLog,
    ) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await?;
        let Some(user) = UserRepo::set_active(&mut *tx, id, is_active).await? else {
            return Ok(None);
        };
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(Some(user))
    }

    // -----------------------------------------------------------------------
    // Tickets
    // -----------------------------------------------------------------------

    async fn find_ticket(&self, id: DbId) -> StoreResult<Option<Ticket>> {
        Ok(TicketRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_tickets(&self, scope: TicketScope) -> StoreResult<Vec<Ticket>> {
        let tickets = match scope {
            TicketScope::All => TicketRepo::list_all(&self.pool).await?,
            TicketScope::AssignedTo(user_id) => {
                TicketRepo::list_assigned_to(&self.pool, user_id).await?
            }
            TicketScope::CreatedBy(user_id) => {
                TicketRepo::list_created_by(&self.pool, user_id).await?
            }
        };
        Ok(tickets)
    }

    async fn create_ticket(
        &self,
        input: &CreateTicket,
        log: &NewActivityLog,
    ) -> StoreResult<Ticket> {
        let mut tx = self.pool.begin().await?;
        let ticket = TicketRepo::create(&mut *tx, input).await?;
        let entry = log.clone().with_ticket_id(ticket.id);
        ActivityLogRepo::insert(&mut *tx, &entry).await?;
        tx.commit().await?;
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: DbId,
        patch: &UpdateTicket,
        log: &NewActivityLog,
    ) -> StoreResult<Option<Ticket>> {
        let mut tx = self.pool.begin().await?;
        let Some(ticket) = TicketRepo::update(&mut *tx, id, patch).await? else {
            return Ok(None);
        };
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(Some(ticket))
    }

    async fn change_ticket_status(
        &self,
        id: DbId,
        change: &StatusChange,
        logs: &[NewActivityLog],
    ) -> StoreResult<Option<Ticket>> {
        let mut tx = self.pool.begin().await?;
        let Some(ticket) = TicketRepo::change_status(&mut *tx, id, change).await? else {
            return Ok(None);
        };
        for entry in logs {
            ActivityLogRepo::insert(&mut *tx, entry).await?;
        }
        tx.commit().await?;
        Ok(Some(ticket))
    }

    async fn change_ticket_priority(
        &self,
        id: DbId,
        expected_priority: &str,
        priority: &str,
        log: &NewActivityLog,
    ) -> StoreResult<Option<Ticket>> {
        let mut tx = self.pool.begin().await?;
        let Some(ticket) =
            TicketRepo::change_priority(&mut *tx, id, expected_priority, priority).await?
        else {
            return Ok(None);
        };
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(Some(ticket))
    }

    async fn delete_ticket(&self, id: DbId, log: &NewActivityLog) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        if !TicketRepo::delete(&mut *tx, id).await? {
            return Ok(false);
        }
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Assignees
    // -----------------------------------------------------------------------

    async fn list_assignees(&self, ticket_id: DbId) -> StoreResult<Vec<TicketAssignee>> {
        Ok(TicketAssigneeRepo::list_for_ticket(&self.pool, ticket_id).await?)
    }

    async fn list_assignments_for_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Vec<TicketAssignee>> {
        Ok(TicketAssigneeRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn find_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<TicketAssignee>> {
        Ok(TicketAssigneeRepo::find(&self.pool, ticket_id, user_id).await?)
    }

    async fn insert_assignee(
        &self,
        input: &CreateTicketAssignee,
        log: &NewActivityLog,
    ) -> StoreResult<TicketAssignee> {
        let mut tx = self.pool.begin().await?;

        if input.is_primary {
            TicketAssigneeRepo::clear_primary(&mut *tx, input.ticket_id).await?;
        }
        // A duplicate pair aborts here with 23505 and the demotion above is
        // rolled back with it.
        let assignee = TicketAssigneeRepo::insert(&mut *tx, input).await?;
        TicketRepo::sync_assigned_to(&mut *tx, input.ticket_id).await?;
        ActivityLogRepo::insert(&mut *tx, log).await?;

        tx.commit().await?;
        Ok(assignee)
    }

    async fn delete_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        log: &NewActivityLog,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        if !TicketAssigneeRepo::delete(&mut *tx, ticket_id, user_id).await? {
            return Ok(false);
        }
        TicketRepo::sync_assigned_to(&mut *tx, ticket_id).await?;
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn complete_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        work_notes: Option<&str>,
        log: &NewActivityLog,
    ) -> StoreResult<Option<TicketAssignee>> {
        let mut tx = self.pool.begin().await?;
        let Some(assignee) =
            TicketAssigneeRepo::complete(&mut *tx, ticket_id, user_id, work_notes).await?
        else {
            return Ok(None);
        };
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(Some(assignee))
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    async fn list_comments(&self, ticket_id: DbId) -> StoreResult<Vec<Comment>> {
        Ok(CommentRepo::list_for_ticket(&self.pool, ticket_id).await?)
    }

    async fn insert_comment(
        &self,
        input: &CreateComment,
        log: &NewActivityLog,
    ) -> StoreResult<Comment> {
        let mut tx = self.pool.begin().await?;
        let comment = CommentRepo::create(&mut *tx, input).await?;
        let entry = log.clone().with_target_id(comment.id);
        ActivityLogRepo::insert(&mut *tx, &entry).await?;
        tx.commit().await?;
        Ok(comment)
    }

    // -----------------------------------------------------------------------
    // Activity
    // -----------------------------------------------------------------------

    async fn record_activity(&self, entry: &NewActivityLog) -> StoreResult<ActivityLog> {
        Ok(ActivityLogRepo::insert(&self.pool, entry).await?)
    }

    async fn list_activity_for_ticket(&self, ticket_id: DbId) -> StoreResult<Vec<ActivityLog>> {
        Ok(ActivityLogRepo::list_for_ticket(&self.pool, ticket_id).await?)
    }

    async fn list_recent_activity(&self, limit: i64) -> StoreResult<Vec<ActivityLog>> {
        Ok(ActivityLogRepo::list_recent(&self.pool, limit).await?)
    }

    // -----------------------------------------------------------------------
    // SLA policies
    // -----------------------------------------------------------------------

    async fn list_sla_policies(&self) -> StoreResult<Vec<SlaPolicy>> {
        Ok(SlaPolicyRepo::list(&self.pool).await?)
    }

    async fn find_sla_policy(&self, priority: &str) -> StoreResult<Option<SlaPolicy>> {
        Ok(SlaPolicyRepo::find(&self.pool, priority).await?)
    }

    async fn upsert_sla_policy(
        &self,
        priority: &str,
        resolution_hours: i32,
        log: &NewActivityLog,
    ) -> StoreResult<SlaPolicy> {
        let mut tx = self.pool.begin().await?;
        let policy = SlaPolicyRepo::upsert(&mut *tx, priority, resolution_hours).await?;
        ActivityLogRepo::insert(&mut *tx, log).await?;
        tx.commit().await?;
        Ok(policy)
    }
}
