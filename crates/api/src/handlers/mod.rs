//! HTTP handlers.
//!
//! Handlers extract the caller and request body, validate the body with
//! `validator` rules, and delegate to [`crate::engine`]. They hold no
//! business rules of their own.

pub mod activity;
pub mod assignees;
pub mod comments;
pub mod me;
pub mod sla;
pub mod tickets;
pub mod users;

use helpdesk_core::error::CoreError;
use helpdesk_core::roles::Role;
use helpdesk_core::ticket::{TicketPriority, TicketStatus};

use crate::error::AppResult;

/// Parse a status string from a request body into a 400 on failure.
pub(crate) fn parse_status(value: &str) -> AppResult<TicketStatus> {
    Ok(TicketStatus::from_str_value(value).map_err(CoreError::Validation)?)
}

pub(crate) fn parse_priority(value: &str) -> AppResult<TicketPriority> {
    Ok(TicketPriority::from_str_value(value).map_err(CoreError::Validation)?)
}

pub(crate) fn parse_role(value: &str) -> AppResult<Role> {
    Ok(Role::from_str_value(value).map_err(CoreError::Validation)?)
}
