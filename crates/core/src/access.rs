//! Record-scoped permission evaluator.
//!
//! Decisions combine the static table in [`crate::permissions`] with the
//! instance context of one ticket. Each decision is two-tiered: a broad
//! permission (e.g. `VIEW_ALL_TICKETS`) grants outright, a narrow one (e.g.
//! `VIEW_ASSIGNED_TICKETS`) grants only together with ownership or
//! assignment. All functions are pure; an absent role or caller id yields
//! `false`.

use serde::Serialize;

use crate::error::CoreError;
use crate::permissions::{has_permission, Permission};
use crate::roles::Role;
use crate::ticket::TicketStatus;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Instance context
// ---------------------------------------------------------------------------

/// The slice of a ticket that access decisions depend on.
///
/// `assignee_ids` comes from the assignment join table, which is the single
/// source of truth for who is assigned.
#[derive(Debug, Clone, Default)]
pub struct TicketAccess {
    pub created_by: DbId,
    pub assignee_ids: Vec<DbId>,
}

impl TicketAccess {
    pub fn new(created_by: DbId, assignee_ids: Vec<DbId>) -> Self {
        Self {
            created_by,
            assignee_ids,
        }
    }

    pub fn is_assigned(&self, caller_id: Option<DbId>) -> bool {
        caller_id.is_some_and(|id| self.assignee_ids.contains(&id))
    }

    pub fn is_creator(&self, caller_id: Option<DbId>) -> bool {
        caller_id == Some(self.created_by)
    }
}

// ---------------------------------------------------------------------------
// Ticket-scoped decisions
// ---------------------------------------------------------------------------

pub fn can_view(role: Option<Role>, ticket: &TicketAccess, caller_id: Option<DbId>) -> bool {
    if caller_id.is_none() {
        return false;
    }
    has_permission(role, Permission::ViewAllTickets)
        || (has_permission(role, Permission::ViewAssignedTickets) && ticket.is_assigned(caller_id))
        || (has_permission(role, Permission::ViewOwnTickets) && ticket.is_creator(caller_id))
}

pub fn can_update(role: Option<Role>, ticket: &TicketAccess, caller_id: Option<DbId>) -> bool {
    if caller_id.is_none() {
        return false;
    }
    has_permission(role, Permission::UpdateAnyTicket)
        || (has_permission(role, Permission::UpdateAssignedTicket)
            && ticket.is_assigned(caller_id))
}

/// Status writes: the role must hold `UPDATE_TICKET_STATUS` and be allowed to
/// update this particular ticket.
pub fn can_change_status(
    role: Option<Role>,
    ticket: &TicketAccess,
    caller_id: Option<DbId>,
) -> bool {
    has_permission(role, Permission::UpdateTicketStatus) && can_update(role, ticket, caller_id)
}

/// Priority writes follow the same gate as status writes.
pub fn can_change_priority(
    role: Option<Role>,
    ticket: &TicketAccess,
    caller_id: Option<DbId>,
) -> bool {
    has_permission(role, Permission::UpdateTicketPriority) && can_update(role, ticket, caller_id)
}

pub fn can_upload_evidence(
    role: Option<Role>,
    ticket: &TicketAccess,
    caller_id: Option<DbId>,
) -> bool {
    if caller_id.is_none() {
        return false;
    }
    has_permission(role, Permission::UploadEvidenceAny)
        || (has_permission(role, Permission::UploadEvidenceAssigned)
            && ticket.is_assigned(caller_id))
}

pub fn can_comment(role: Option<Role>, ticket: &TicketAccess, caller_id: Option<DbId>) -> bool {
    has_permission(role, Permission::AddComment) && can_view(role, ticket, caller_id)
}

/// Marking an assignment complete: the assignee themself, or anyone who may
/// update any ticket.
pub fn can_complete_assignment(
    role: Option<Role>,
    assignee_id: DbId,
    caller_id: Option<DbId>,
) -> bool {
    if caller_id.is_none() {
        return false;
    }
    has_permission(role, Permission::UpdateAnyTicket)
        || (has_permission(role, Permission::UpdateAssignedTicket)
            && caller_id == Some(assignee_id))
}

/// Leaving `closed` needs `REOPEN_TICKET`; every other transition only needs
/// the status gate.
pub fn can_transition(role: Option<Role>, from: TicketStatus, to: TicketStatus) -> bool {
    if from.is_terminal() && to != from {
        return has_permission(role, Permission::ReopenTicket);
    }
    true
}

// ---------------------------------------------------------------------------
// Role-only decisions
// ---------------------------------------------------------------------------

pub fn can_assign(role: Option<Role>) -> bool {
    has_permission(role, Permission::AssignTicket)
}

pub fn can_delete(role: Option<Role>) -> bool {
    has_permission(role, Permission::DeleteTicket)
}

pub fn can_create(role: Option<Role>) -> bool {
    has_permission(role, Permission::CreateTicket)
}

pub fn can_view_all(role: Option<Role>) -> bool {
    has_permission(role, Permission::ViewAllTickets)
}

pub fn can_view_analytics(role: Option<Role>) -> bool {
    has_permission(role, Permission::ViewAnalytics)
}

pub fn can_manage_users(role: Option<Role>) -> bool {
    has_permission(role, Permission::ManageUsers)
}

pub fn can_configure_sla(role: Option<Role>) -> bool {
    has_permission(role, Permission::ConfigureSla)
}

// ---------------------------------------------------------------------------
// Denials
// ---------------------------------------------------------------------------

/// Turn a decision into a `Forbidden` error naming the permission the caller
/// would need.
pub fn require(allowed: bool, permission: Permission) -> Result<(), CoreError> {
    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Missing permission {permission}"
        )))
    }
}

/// Like [`require`], for decisions that also depend on ticket assignment.
pub fn require_on_ticket(
    allowed: bool,
    permission: Permission,
    ticket_id: DbId,
) -> Result<(), CoreError> {
    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Missing permission {permission} (or assignment) on ticket {ticket_id}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Summaries for UI layers
// ---------------------------------------------------------------------------

/// Every ticket-scoped decision for one caller, precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TicketPermissions {
    pub can_view: bool,
    pub can_update: bool,
    pub can_change_status: bool,
    pub can_change_priority: bool,
    pub can_assign: bool,
    pub can_delete: bool,
    pub can_upload_evidence: bool,
    pub can_comment: bool,
}

pub fn ticket_permissions(
    role: Option<Role>,
    ticket: &TicketAccess,
    caller_id: Option<DbId>,
) -> TicketPermissions {
    TicketPermissions {
        can_view: can_view(role, ticket, caller_id),
        can_update: can_update(role, ticket, caller_id),
        can_change_status: can_change_status(role, ticket, caller_id),
        can_change_priority: can_change_priority(role, ticket, caller_id),
        can_assign: can_assign(role),
        can_delete: can_delete(role),
        can_upload_evidence: can_upload_evidence(role, ticket, caller_id),
        can_comment: can_comment(role, ticket, caller_id),
    }
}

/// Caller-wide capabilities that do not depend on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalPermissions {
    pub role: Option<Role>,
    pub permissions: Vec<Permission>,
    pub can_create: bool,
    pub can_view_all: bool,
    pub can_assign: bool,
    pub can_view_analytics: bool,
    pub can_manage_users: bool,
    pub can_configure_sla: bool,
}

pub fn global_permissions(role: Option<Role>) -> GlobalPermissions {
    GlobalPermissions {
        role,
        permissions: crate::permissions::permissions_for(role),
        can_create: can_create(role),
        can_view_all: can_view_all(role),
        can_assign: can_assign(role),
        can_view_analytics: can_view_analytics(role),
        can_manage_users: can_manage_users(role),
        can_configure_sla: can_configure_sla(role),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: DbId = 10;
    const TECH: DbId = 20;
    const OTHER_TECH: DbId = 21;
    const OTHER_EMPLOYEE: DbId = 30;

    fn ticket() -> TicketAccess {
        TicketAccess::new(CREATOR, vec![TECH])
    }

    // -----------------------------------------------------------------------
    // Unknown / absent identity
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_role_is_denied_everything() {
        let role = Role::parse("superuser");
        let t = ticket();
        let p = ticket_permissions(role, &t, Some(CREATOR));
        assert_eq!(
            p,
            TicketPermissions {
                can_view: false,
                can_update: false,
                can_change_status: false,
                can_change_priority: false,
                can_assign: false,
                can_delete: false,
                can_upload_evidence: false,
                can_comment: false,
            }
        );
        assert!(!can_view_analytics(role));
        assert!(!can_manage_users(role));
        assert!(!can_configure_sla(role));
        assert!(!can_complete_assignment(role, TECH, Some(TECH)));
    }

    #[test]
    fn missing_caller_id_is_denied_even_for_admin() {
        let t = ticket();
        assert!(!can_view(Some(Role::Admin), &t, None));
        assert!(!can_update(Some(Role::Admin), &t, None));
        assert!(!can_upload_evidence(Some(Role::Admin), &t, None));
        assert!(!can_complete_assignment(Some(Role::Admin), TECH, None));
    }

    // -----------------------------------------------------------------------
    // canView
    // -----------------------------------------------------------------------

    #[test]
    fn admin_and_manager_view_everything() {
        let t = ticket();
        assert!(can_view(Some(Role::Admin), &t, Some(999)));
        assert!(can_view(Some(Role::Manager), &t, Some(999)));
    }

    #[test]
    fn technician_views_only_assigned() {
        let t = ticket();
        assert!(can_view(Some(Role::Technician), &t, Some(TECH)));
        assert!(!can_view(Some(Role::Technician), &t, Some(OTHER_TECH)));
    }

    #[test]
    fn employee_views_only_own() {
        let t = ticket();
        assert!(can_view(Some(Role::Employee), &t, Some(CREATOR)));
        assert!(!can_view(Some(Role::Employee), &t, Some(OTHER_EMPLOYEE)));
    }

    #[test]
    fn technician_creator_without_assignment_cannot_view() {
        let t = TicketAccess::new(TECH, vec![]);
        assert!(!can_view(Some(Role::Technician), &t, Some(TECH)));
    }

    // -----------------------------------------------------------------------
    // canUpdate and the status gate
    // -----------------------------------------------------------------------

    #[test]
    fn unassigned_technician_cannot_update() {
        let t = ticket();
        assert!(!can_update(Some(Role::Technician), &t, Some(OTHER_TECH)));
        assert!(!can_change_status(Some(Role::Technician), &t, Some(OTHER_TECH)));
        assert!(!can_change_priority(Some(Role::Technician), &t, Some(OTHER_TECH)));
    }

    #[test]
    fn assigned_technician_can_update() {
        let t = ticket();
        assert!(can_update(Some(Role::Technician), &t, Some(TECH)));
        assert!(can_change_status(Some(Role::Technician), &t, Some(TECH)));
    }

    #[test]
    fn employee_never_updates_even_own_ticket() {
        let t = ticket();
        assert!(!can_update(Some(Role::Employee), &t, Some(CREATOR)));
        assert!(!can_change_status(Some(Role::Employee), &t, Some(CREATOR)));
    }

    #[test]
    fn managers_update_unconditionally() {
        let t = TicketAccess::new(CREATOR, vec![]);
        assert!(can_update(Some(Role::Manager), &t, Some(1)));
        assert!(can_change_status(Some(Role::Manager), &t, Some(1)));
        assert!(can_change_priority(Some(Role::Admin), &t, Some(1)));
    }

    // -----------------------------------------------------------------------
    // Other decisions
    // -----------------------------------------------------------------------

    #[test]
    fn role_only_decisions() {
        assert!(can_assign(Some(Role::Manager)));
        assert!(!can_assign(Some(Role::Technician)));
        assert!(can_delete(Some(Role::Admin)));
        assert!(!can_delete(Some(Role::Manager)));
        assert!(can_manage_users(Some(Role::Admin)));
        assert!(!can_manage_users(Some(Role::Manager)));
        assert!(can_configure_sla(Some(Role::Manager)));
        assert!(!can_view_analytics(Some(Role::Employee)));
    }

    #[test]
    fn evidence_follows_assignment_for_technicians() {
        let t = ticket();
        assert!(can_upload_evidence(Some(Role::Manager), &t, Some(1)));
        assert!(can_upload_evidence(Some(Role::Technician), &t, Some(TECH)));
        assert!(!can_upload_evidence(Some(Role::Technician), &t, Some(OTHER_TECH)));
        assert!(!can_upload_evidence(Some(Role::Employee), &t, Some(CREATOR)));
    }

    #[test]
    fn employee_comments_on_own_ticket_only() {
        let t = ticket();
        assert!(can_comment(Some(Role::Employee), &t, Some(CREATOR)));
        assert!(!can_comment(Some(Role::Employee), &t, Some(OTHER_EMPLOYEE)));
    }

    #[test]
    fn completion_is_self_or_supervisor() {
        assert!(can_complete_assignment(Some(Role::Technician), TECH, Some(TECH)));
        assert!(!can_complete_assignment(Some(Role::Technician), TECH, Some(OTHER_TECH)));
        assert!(can_complete_assignment(Some(Role::Manager), TECH, Some(1)));
        assert!(!can_complete_assignment(Some(Role::Employee), TECH, Some(TECH)));
    }

    #[test]
    fn reopening_closed_ticket_needs_reopen_permission() {
        use TicketStatus::*;
        assert!(can_transition(Some(Role::Manager), Closed, Open));
        assert!(!can_transition(Some(Role::Technician), Closed, InProgress));
        assert!(can_transition(Some(Role::Technician), Resolved, Closed));
        assert!(can_transition(Some(Role::Technician), OnEscalation, InProgress));
    }

    #[test]
    fn require_names_the_permission() {
        let err = require(false, Permission::AssignTicket).unwrap_err();
        assert!(err.to_string().contains("ASSIGN_TICKET"));
        assert!(require(true, Permission::AssignTicket).is_ok());

        let err = require_on_ticket(false, Permission::UpdateTicketStatus, 7).unwrap_err();
        assert!(err.to_string().contains("UPDATE_TICKET_STATUS"));
        assert!(err.to_string().contains("ticket 7"));
    }

    #[test]
    fn global_summary_for_manager() {
        let g = global_permissions(Some(Role::Manager));
        assert!(g.can_view_all);
        assert!(g.can_assign);
        assert!(!g.can_manage_users);
        assert!(g.permissions.contains(&Permission::ConfigureSla));
    }
}
