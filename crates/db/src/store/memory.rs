//! In-process [`TicketStore`] for tests and local tooling.
//!
//! All state lives behind one `tokio::sync::RwLock`. A mutating method
//! validates every constraint it would hit before touching state, then
//! applies the mutation and its activity entries under the same write
//! guard, so a failed call leaves nothing behind.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use helpdesk_core::roles::VALID_ROLES;
use helpdesk_core::sla::default_resolution_hours;
use helpdesk_core::ticket::{TicketPriority, STATUS_NEW};
use helpdesk_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use crate::models::activity_log::{ActivityLog, NewActivityLog};
use crate::models::comment::{Comment, CreateComment};
use crate::models::sla_policy::SlaPolicy;
use crate::models::ticket::{CreateTicket, StatusChange, Ticket, TicketScope, UpdateTicket};
use crate::models::ticket_assignee::{CreateTicketAssignee, TicketAssignee};
use crate::models::user::{CreateUser, User};

use super::{StoreError, StoreResult, TicketStore, UQ_TICKET_ASSIGNEE};

#[derive(Default)]
struct State {
    users: BTreeMap<DbId, User>,
    tickets: BTreeMap<DbId, Ticket>,
    assignees: Vec<TicketAssignee>,
    comments: Vec<Comment>,
    activity: Vec<ActivityLog>,
    sla_policies: BTreeMap<String, SlaPolicy>,
    last_id: DbId,
    last_timestamp: Option<Timestamp>,
}

fn fk_violation(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: constraint.to_string(),
    }
}

impl State {
    /// Ids come from one shared sequence; uniqueness is all callers need.
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    /// Strictly increasing wall-clock time, so rows written back to back
    /// never share a `created_at`.
    fn now(&mut self) -> Timestamp {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn check_user(&self, user_id: DbId, constraint: &str) -> StoreResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(fk_violation(constraint))
        }
    }

    fn check_role(role: &str) -> StoreResult<()> {
        if VALID_ROLES.contains(&role) {
            Ok(())
        } else {
            Err(StoreError::Backend(format!(
                "check constraint chk_users_role violated by '{role}'"
            )))
        }
    }

    fn check_activity(&self, entry: &NewActivityLog) -> StoreResult<()> {
        self.check_user(entry.user_id, "activity_logs_user_id_fkey")
    }

    fn append_activity(&mut self, entry: &NewActivityLog) -> ActivityLog {
        let log = ActivityLog {
            id: self.next_id(),
            user_id: entry.user_id,
            ticket_id: entry.ticket_id,
            action: entry.action.clone(),
            target_type: entry.target_type.clone(),
            target_id: entry.target_id,
            details: entry.details.clone(),
            created_at: self.now(),
        };
        self.activity.push(log.clone());
        log
    }

    fn sync_assigned_to(&mut self, ticket_id: DbId) {
        let primary = self
            .assignees
            .iter()
            .filter(|a| a.ticket_id == ticket_id && a.is_primary)
            .min_by_key(|a| (a.assigned_at, a.id))
            .map(|a| a.user_id);
        if let Some(ticket) = self.tickets.get_mut(&ticket_id) {
            ticket.assigned_to = primary;
        }
    }

    fn touch_ticket(&mut self, id: DbId) -> Option<&mut Ticket> {
        let now = self.now();
        let ticket = self.tickets.get_mut(&id)?;
        ticket.updated_at = now;
        Some(ticket)
    }
}

/// A [`TicketStore`] holding everything in memory. Seeded with the default
/// SLA policies, like a freshly migrated database.
pub struct MemoryTicketStore {
    state: RwLock<State>,
}

impl Default for MemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        let mut state = State::default();
        for priority in TicketPriority::ALL {
            let updated_at = state.now();
            state.sla_policies.insert(
                priority.as_str().to_string(),
                SlaPolicy {
                    priority: priority.as_str().to_string(),
                    resolution_hours: default_resolution_hours(priority),
                    updated_at,
                },
            );
        }
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        State::check_role(&input.role)?;
        if state.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_users_email".to_string(),
            });
        }
        let now = state.now();
        let user = User {
            id: state.next_id(),
            full_name: input.full_name.clone(),
            email: input.email.clone(),
            role: input.role.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self, role: Option<&str>, active_only: bool) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .filter(|u| !active_only || u.is_active)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn update_user_role(
        &self,
        id: DbId,
        role: &str,
        log: &NewActivityLog,
    ) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        State::check_role(role)?;
        state.check_activity(log)?;

        let now = state.now();
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        user.role = role.to_string();
        user.updated_at = now;
        let user = user.clone();
        state.append_activity(log);
        Ok(Some(user))
    }

    async fn set_user_active(
        &self,
        id: DbId,
        is_active: bool,
        log: &NewActivityLog,
    ) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        state.check_activity(log)?;

        let now = state.now();
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        user.is_active = is_active;
        user.updated_at = now;
        let user = user.clone();
        state.append_activity(log);
        Ok(Some(user))
    }

    // -----------------------------------------------------------------------
    // Tickets
    // -----------------------------------------------------------------------

    async fn find_ticket(&self, id: DbId) -> StoreResult<Option<Ticket>> {
        Ok(self.state.read().await.tickets.get(&id).cloned())
    }

    async fn list_tickets(&self, scope: TicketScope) -> StoreResult<Vec<Ticket>> {
        let state = self.state.read().await;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .values()
            .filter(|t| match scope {
                TicketScope::All => true,
                TicketScope::CreatedBy(user_id) => t.created_by == user_id,
                TicketScope::AssignedTo(user_id) => state
                    .assignees
                    .iter()
                    .any(|a| a.ticket_id == t.id && a.user_id == user_id),
            })
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tickets)
    }

    async fn create_ticket(
        &self,
        input: &CreateTicket,
        log: &NewActivityLog,
    ) -> StoreResult<Ticket> {
        let mut state = self.state.write().await;
        state.check_user(input.created_by, "tickets_created_by_fkey")?;
        state.check_activity(log)?;

        let now = state.now();
        let ticket = Ticket {
            id: state.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            priority: input.priority.clone(),
            status: STATUS_NEW.to_string(),
            created_by: input.created_by,
            assigned_to: None,
            due_at: input.due_at,
            sla_breach: false,
            resolved_at: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
        };
        state.tickets.insert(ticket.id, ticket.clone());
        state.append_activity(&log.clone().with_ticket_id(ticket.id));
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: DbId,
        patch: &UpdateTicket,
        log: &NewActivityLog,
    ) -> StoreResult<Option<Ticket>> {
        let mut state = self.state.write().await;
        if !state.tickets.contains_key(&id) {
            return Ok(None);
        }
        state.check_activity(log)?;

        let Some(ticket) = state.touch_ticket(id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &patch.description {
            ticket.description = description.clone();
        }
        if let Some(due_at) = patch.due_at {
            ticket.due_at = Some(due_at);
        }
        let ticket = ticket.clone();
        state.append_activity(log);
        Ok(Some(ticket))
    }

    async fn change_ticket_status(
        &self,
        id: DbId,
        change: &StatusChange,
        logs: &[NewActivityLog],
    ) -> StoreResult<Option<Ticket>> {
        let mut state = self.state.write().await;
        match state.tickets.get(&id) {
            Some(t) if t.status == change.expected_status => {}
            _ => return Ok(None),
        }
        for entry in logs {
            state.check_activity(entry)?;
        }

        let Some(ticket) = state.touch_ticket(id) else {
            return Ok(None);
        };
        ticket.status = change.new_status.clone();
        ticket.resolved_at = change.resolved_at;
        ticket.closed_at = change.closed_at;
        ticket.sla_breach = ticket.sla_breach || change.latch_breach;
        let ticket = ticket.clone();
        for entry in logs {
            state.append_activity(entry);
        }
        Ok(Some(ticket))
    }

    async fn change_ticket_priority(
        &self,
        id: DbId,
        expected_priority: &str,
        priority: &str,
        log: &NewActivityLog,
    ) -> StoreResult<Option<Ticket>> {
        let mut state = self.state.write().await;
        match state.tickets.get(&id) {
            Some(t) if t.priority == expected_priority => {}
            _ => return Ok(None),
        }
        state.check_activity(log)?;

        let Some(ticket) = state.touch_ticket(id) else {
            return Ok(None);
        };
        ticket.priority = priority.to_string();
        let ticket = ticket.clone();
        state.append_activity(log);
        Ok(Some(ticket))
    }

    async fn delete_ticket(&self, id: DbId, log: &NewActivityLog) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if !state.tickets.contains_key(&id) {
            return Ok(false);
        }
        state.check_activity(log)?;

        state.tickets.remove(&id);
        state.assignees.retain(|a| a.ticket_id != id);
        state.comments.retain(|c| c.ticket_id != id);
        state.append_activity(log);
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Assignees
    // -----------------------------------------------------------------------

    async fn list_assignees(&self, ticket_id: DbId) -> StoreResult<Vec<TicketAssignee>> {
        let state = self.state.read().await;
        let mut assignees: Vec<TicketAssignee> = state
            .assignees
            .iter()
            .filter(|a| a.ticket_id == ticket_id)
            .cloned()
            .collect();
        assignees.sort_by_key(|a| (!a.is_primary, a.assigned_at, a.id));
        Ok(assignees)
    }

    async fn list_assignments_for_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Vec<TicketAssignee>> {
        let state = self.state.read().await;
        let mut assignments: Vec<TicketAssignee> = state
            .assignees
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.assigned_at, a.id));
        Ok(assignments)
    }

    async fn find_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<TicketAssignee>> {
        let state = self.state.read().await;
        Ok(state
            .assignees
            .iter()
            .find(|a| a.ticket_id == ticket_id && a.user_id == user_id)
            .cloned())
    }

    async fn insert_assignee(
        &self,
        input: &CreateTicketAssignee,
        log: &NewActivityLog,
    ) -> StoreResult<TicketAssignee> {
        let mut state = self.state.write().await;
        if !state.tickets.contains_key(&input.ticket_id) {
            return Err(fk_violation("ticket_assignees_ticket_id_fkey"));
        }
        let (full_name, email) = match state.users.get(&input.user_id) {
            Some(user) => (user.full_name.clone(), user.email.clone()),
            None => return Err(fk_violation("ticket_assignees_user_id_fkey")),
        };
        if let Some(by) = input.assigned_by {
            state.check_user(by, "ticket_assignees_assigned_by_fkey")?;
        }
        if state
            .assignees
            .iter()
            .any(|a| a.ticket_id == input.ticket_id && a.user_id == input.user_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_TICKET_ASSIGNEE.to_string(),
            });
        }
        state.check_activity(log)?;

        if input.is_primary {
            for a in state
                .assignees
                .iter_mut()
                .filter(|a| a.ticket_id == input.ticket_id)
            {
                a.is_primary = false;
            }
        }
        let assignee = TicketAssignee {
            id: state.next_id(),
            ticket_id: input.ticket_id,
            user_id: input.user_id,
            is_primary: input.is_primary,
            assigned_at: state.now(),
            assigned_by: input.assigned_by,
            completed_at: None,
            work_notes: input.work_notes.clone(),
            full_name,
            email,
        };
        state.assignees.push(assignee.clone());
        state.sync_assigned_to(input.ticket_id);
        state.append_activity(log);
        Ok(assignee)
    }

    async fn delete_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        log: &NewActivityLog,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let Some(index) = state
            .assignees
            .iter()
            .position(|a| a.ticket_id == ticket_id && a.user_id == user_id)
        else {
            return Ok(false);
        };
        state.check_activity(log)?;

        state.assignees.remove(index);
        state.sync_assigned_to(ticket_id);
        state.append_activity(log);
        Ok(true)
    }

    async fn complete_assignee(
        &self,
        ticket_id: DbId,
        user_id: DbId,
        work_notes: Option<&str>,
        log: &NewActivityLog,
    ) -> StoreResult<Option<TicketAssignee>> {
        let mut state = self.state.write().await;
        let Some(index) = state.assignees.iter().position(|a| {
            a.ticket_id == ticket_id && a.user_id == user_id && a.completed_at.is_none()
        }) else {
            return Ok(None);
        };
        state.check_activity(log)?;

        let now = state.now();
        let assignee = &mut state.assignees[index];
        assignee.completed_at = Some(now);
        if let Some(notes) = work_notes {
            assignee.work_notes = Some(notes.to_string());
        }
        let assignee = assignee.clone();
        state.append_activity(log);
        Ok(Some(assignee))
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    async fn list_comments(&self, ticket_id: DbId) -> StoreResult<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect())
    }

    async fn insert_comment(
        &self,
        input: &CreateComment,
        log: &NewActivityLog,
    ) -> StoreResult<Comment> {
        let mut state = self.state.write().await;
        if !state.tickets.contains_key(&input.ticket_id) {
            return Err(fk_violation("comments_ticket_id_fkey"));
        }
        state.check_user(input.user_id, "comments_user_id_fkey")?;
        state.check_activity(log)?;

        let comment = Comment {
            id: state.next_id(),
            ticket_id: input.ticket_id,
            user_id: input.user_id,
            content: input.content.clone(),
            created_at: state.now(),
        };
        state.comments.push(comment.clone());
        state.append_activity(&log.clone().with_target_id(comment.id));
        Ok(comment)
    }

    // -----------------------------------------------------------------------
    // Activity
    // -----------------------------------------------------------------------

    async fn record_activity(&self, entry: &NewActivityLog) -> StoreResult<ActivityLog> {
        let mut state = self.state.write().await;
        state.check_activity(entry)?;
        Ok(state.append_activity(entry))
    }

    async fn list_activity_for_ticket(&self, ticket_id: DbId) -> StoreResult<Vec<ActivityLog>> {
        let state = self.state.read().await;
        Ok(state
            .activity
            .iter()
            .filter(|log| log.ticket_id == Some(ticket_id))
            .cloned()
            .collect())
    }

    async fn list_recent_activity(&self, limit: i64) -> StoreResult<Vec<ActivityLog>> {
        let state = self.state.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.activity.iter().rev().take(limit).cloned().collect())
    }

    // -----------------------------------------------------------------------
    // SLA policies
    // -----------------------------------------------------------------------

    async fn list_sla_policies(&self) -> StoreResult<Vec<SlaPolicy>> {
        let state = self.state.read().await;
        let mut policies: Vec<SlaPolicy> = state.sla_policies.values().cloned().collect();
        policies.sort_by_key(|p| p.resolution_hours);
        Ok(policies)
    }

    async fn find_sla_policy(&self, priority: &str) -> StoreResult<Option<SlaPolicy>> {
        Ok(self.state.read().await.sla_policies.get(priority).cloned())
    }

    async fn upsert_sla_policy(
        &self,
        priority: &str,
        resolution_hours: i32,
        log: &NewActivityLog,
    ) -> StoreResult<SlaPolicy> {
        let mut state = self.state.write().await;
        state.check_activity(log)?;

        let policy = SlaPolicy {
            priority: priority.to_string(),
            resolution_hours,
            updated_at: state.now(),
        };
        state
            .sla_policies
            .insert(priority.to_string(), policy.clone());
        state.append_activity(log);
        Ok(policy)
    }
}
