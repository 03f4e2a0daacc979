//! Static role -> permission table.
//!
//! Every action the workflow engine performs is gated by exactly one entry
//! here. [`Permission::granted_to`] is a total `match`, so adding a variant
//! without a table row fails to compile. Nothing outside this module compares
//! roles directly.

use std::fmt;

use serde::Serialize;

use crate::roles::Role::{self, Admin, Employee, Manager, Technician};

// ---------------------------------------------------------------------------
// Permission names
// ---------------------------------------------------------------------------

/// A named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewAllTickets,
    ViewAssignedTickets,
    ViewOwnTickets,
    CreateTicket,
    UpdateAnyTicket,
    UpdateAssignedTicket,
    UpdateTicketStatus,
    UpdateTicketPriority,
    ReopenTicket,
    AssignTicket,
    DeleteTicket,
    UploadEvidenceAny,
    UploadEvidenceAssigned,
    AddComment,
    ViewAnalytics,
    ManageUsers,
    ConfigureSla,
}

impl Permission {
    pub const ALL: [Permission; 17] = [
        Permission::ViewAllTickets,
        Permission::ViewAssignedTickets,
        Permission::ViewOwnTickets,
        Permission::CreateTicket,
        Permission::UpdateAnyTicket,
        Permission::UpdateAssignedTicket,
        Permission::UpdateTicketStatus,
        Permission::UpdateTicketPriority,
        Permission::ReopenTicket,
        Permission::AssignTicket,
        Permission::DeleteTicket,
        Permission::UploadEvidenceAny,
        Permission::UploadEvidenceAssigned,
        Permission::AddComment,
        Permission::ViewAnalytics,
        Permission::ManageUsers,
        Permission::ConfigureSla,
    ];

    /// The table itself: roles holding this permission.
    pub const fn granted_to(self) -> &'static [Role] {
        match self {
            Self::ViewAllTickets => &[Admin, Manager],
            Self::ViewAssignedTickets => &[Technician],
            Self::ViewOwnTickets => &[Employee],
            Self::CreateTicket => &[Admin, Manager, Technician, Employee],
            Self::UpdateAnyTicket => &[Admin, Manager],
            Self::UpdateAssignedTicket => &[Technician],
            Self::UpdateTicketStatus => &[Admin, Manager, Technician],
            Self::UpdateTicketPriority => &[Admin, Manager, Technician],
            Self::ReopenTicket => &[Admin, Manager],
            Self::AssignTicket => &[Admin, Manager],
            Self::DeleteTicket => &[Admin],
            Self::UploadEvidenceAny => &[Admin, Manager],
            Self::UploadEvidenceAssigned => &[Technician],
            Self::AddComment => &[Admin, Manager, Technician, Employee],
            Self::ViewAnalytics => &[Admin, Manager],
            Self::ManageUsers => &[Admin],
            Self::ConfigureSla => &[Admin, Manager],
        }
    }

    /// Wire name, e.g. `"ASSIGN_TICKET"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ViewAllTickets => "VIEW_ALL_TICKETS",
            Self::ViewAssignedTickets => "VIEW_ASSIGNED_TICKETS",
            Self::ViewOwnTickets => "VIEW_OWN_TICKETS",
            Self::CreateTicket => "CREATE_TICKET",
            Self::UpdateAnyTicket => "UPDATE_ANY_TICKET",
            Self::UpdateAssignedTicket => "UPDATE_ASSIGNED_TICKET",
            Self::UpdateTicketStatus => "UPDATE_TICKET_STATUS",
            Self::UpdateTicketPriority => "UPDATE_TICKET_PRIORITY",
            Self::ReopenTicket => "REOPEN_TICKET",
            Self::AssignTicket => "ASSIGN_TICKET",
            Self::DeleteTicket => "DELETE_TICKET",
            Self::UploadEvidenceAny => "UPLOAD_EVIDENCE_ANY",
            Self::UploadEvidenceAssigned => "UPLOAD_EVIDENCE_ASSIGNED",
            Self::AddComment => "ADD_COMMENT",
            Self::ViewAnalytics => "VIEW_ANALYTICS",
            Self::ManageUsers => "MANAGE_USERS",
            Self::ConfigureSla => "CONFIGURE_SLA",
        }
    }

    /// Look up a permission by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Whether `role` holds `permission`. An absent role holds nothing.
pub fn has_permission(role: Option<Role>, permission: Permission) -> bool {
    role.is_some_and(|r| permission.granted_to().contains(&r))
}

/// String-keyed variant for callers holding raw role / permission names.
///
/// Unknown roles and unknown permission names both yield `false`.
pub fn has_permission_named(role: &str, permission_name: &str) -> bool {
    match Permission::from_name(permission_name) {
        Some(permission) => has_permission(Role::parse(role), permission),
        None => false,
    }
}

/// All permissions held by `role`, in table order.
pub fn permissions_for(role: Option<Role>) -> Vec<Permission> {
    Permission::ALL
        .into_iter()
        .filter(|p| has_permission(role, *p))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
