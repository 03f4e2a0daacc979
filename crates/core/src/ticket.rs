//! Ticket status and priority model (state machine vocabulary).
//!
//! The documented lifecycle is
//! `new -> open -> in_progress -> on_escalation -> resolved -> closed`, with
//! escalation reachable from `open`/`in_progress` and able to return to
//! `in_progress`. Writes are not restricted to that graph: any holder of the
//! status gate may set any status, except that leaving `closed` needs
//! `REOPEN_TICKET` (see [`crate::access::can_transition`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activity::action_types;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_NEW: &str = "new";
pub const STATUS_OPEN: &str = "open";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_ON_ESCALATION: &str = "on_escalation";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_CLOSED: &str = "closed";

/// All valid status strings.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_NEW,
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_ON_ESCALATION,
    STATUS_RESOLVED,
    STATUS_CLOSED,
];

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_CRITICAL: &str = "critical";

/// All valid priority strings.
pub const VALID_PRIORITIES: &[&str] = &[
    PRIORITY_LOW,
    PRIORITY_MEDIUM,
    PRIORITY_HIGH,
    PRIORITY_CRITICAL,
];

/// Maximum ticket title length.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum ticket description length.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    Open,
    InProgress,
    OnEscalation,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_NEW => Ok(Self::New),
            STATUS_OPEN => Ok(Self::Open),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_ON_ESCALATION => Ok(Self::OnEscalation),
            STATUS_RESOLVED => Ok(Self::Resolved),
            STATUS_CLOSED => Ok(Self::Closed),
            _ => Err(format!(
                "Invalid status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => STATUS_NEW,
            Self::Open => STATUS_OPEN,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::OnEscalation => STATUS_ON_ESCALATION,
            Self::Resolved => STATUS_RESOLVED,
            Self::Closed => STATUS_CLOSED,
        }
    }

    /// Resolved and closed tickets carry no SLA indicator.
    pub fn suppresses_sla(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Leaving a terminal status is a reopen and needs `REOPEN_TICKET`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Extra audit action recorded when a ticket enters this status, on top
    /// of `status_changed`.
    pub fn entry_action(&self) -> Option<&'static str> {
        match self {
            Self::Resolved => Some(action_types::TICKET_RESOLVED),
            Self::Closed => Some(action_types::TICKET_CLOSED),
            _ => None,
        }
    }

    /// Whether `self -> to` follows the documented lifecycle graph.
    ///
    /// Used only for diagnostics; off-graph writes are still permitted.
    pub fn is_standard_transition(&self, to: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (*self, to),
            (New, Open)
                | (Open, InProgress)
                | (Open, OnEscalation)
                | (InProgress, OnEscalation)
                | (OnEscalation, InProgress)
                | (InProgress, Resolved)
                | (OnEscalation, Resolved)
                | (Resolved, Closed)
        )
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Critical,
    ];

    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            PRIORITY_LOW => Ok(Self::Low),
            PRIORITY_MEDIUM => Ok(Self::Medium),
            PRIORITY_HIGH => Ok(Self::High),
            PRIORITY_CRITICAL => Ok(Self::Critical),
            _ => Err(format!(
                "Invalid priority '{s}'. Must be one of: {}",
                VALID_PRIORITIES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => PRIORITY_LOW,
            Self::Medium => PRIORITY_MEDIUM,
            Self::High => PRIORITY_HIGH,
            Self::Critical => PRIORITY_CRITICAL,
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
