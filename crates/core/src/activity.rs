//! Activity log vocabulary and rendering.
//!
//! The activity log is append-only; this module only names the actions,
//! shapes their `details` payloads, and turns stored entries back into
//! display sentences. Rendering never fails: unknown actions and missing
//! detail keys fall back to generic text.

use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action tags for activity log entries.
pub mod action_types {
    pub const TICKET_CREATED: &str = "ticket_created";
    pub const TICKET_UPDATED: &str = "ticket_updated";
    pub const TICKET_DELETED: &str = "ticket_deleted";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const TICKET_RESOLVED: &str = "ticket_resolved";
    pub const TICKET_CLOSED: &str = "ticket_closed";
    pub const PRIORITY_CHANGED: &str = "priority_changed";
    pub const TECHNICIAN_ASSIGN: &str = "technician_assign";
    pub const TECHNICIAN_REMOVE: &str = "technician_remove";
    pub const TECHNICIAN_COMPLETE: &str = "technician_complete";
    pub const COMMENT_ADDED: &str = "comment_added";
    pub const ROLE_CHANGED: &str = "role_changed";
    pub const USER_ACTIVATED: &str = "user_activated";
    pub const USER_DEACTIVATED: &str = "user_deactivated";
    pub const SLA_POLICY_UPDATED: &str = "sla_policy_updated";
}

/// Known `target_type` values.
pub mod target_types {
    pub const TICKET: &str = "ticket";
    pub const USER: &str = "user";
    pub const COMMENT: &str = "comment";
    pub const SLA_POLICY: &str = "sla_policy";
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Default number of entries returned by the recent-activity feed.
pub const DEFAULT_RECENT_LIMIT: i64 = 20;

/// Upper bound on the recent-activity feed.
pub const MAX_RECENT_LIMIT: i64 = 100;

/// Clamp a caller-supplied `limit` into `1..=MAX_RECENT_LIMIT`.
pub fn clamp_recent_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_RECENT_LIMIT)
}

// ---------------------------------------------------------------------------
// Details payloads
// ---------------------------------------------------------------------------

pub fn status_changed_details(old_status: &str, new_status: &str) -> Value {
    json!({ "old_status": old_status, "new_status": new_status })
}

pub fn priority_changed_details(old_priority: &str, new_priority: &str) -> Value {
    json!({ "old_priority": old_priority, "new_priority": new_priority })
}

pub fn technician_assign_details(
    technician_id: i64,
    technician_name: &str,
    is_primary: bool,
    demoted_user_id: Option<i64>,
) -> Value {
    let mut details = json!({
        "technician_id": technician_id,
        "technician_name": technician_name,
        "is_primary": is_primary,
    });
    if let Some(demoted) = demoted_user_id {
        details["demoted_user_id"] = json!(demoted);
    }
    details
}

pub fn technician_details(technician_id: i64, technician_name: &str) -> Value {
    json!({ "technician_id": technician_id, "technician_name": technician_name })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Read a detail field as display text, `"unknown"` when absent.
fn field<'a>(details: &'a Value, key: &str) -> std::borrow::Cow<'a, str> {
    match details.get(key) {
        Some(Value::String(s)) => std::borrow::Cow::Borrowed(s.as_str()),
        Some(Value::Null) | None => std::borrow::Cow::Borrowed("unknown"),
        Some(other) => std::borrow::Cow::Owned(other.to_string()),
    }
}

/// Map an action tag and its details to a display sentence.
pub fn render_message(action: &str, details: &Value) -> String {
    match action {
        action_types::TICKET_CREATED => "Created this ticket".to_string(),
        action_types::TICKET_UPDATED => {
            let fields = details
                .get("fields")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "ticket details".to_string());
            format!("Updated {fields}")
        }
        action_types::TICKET_DELETED => {
            format!("Deleted ticket \"{}\"", field(details, "title"))
        }
        action_types::STATUS_CHANGED => format!(
            "Changed status from {} to {}",
            field(details, "old_status"),
            field(details, "new_status")
        ),
        action_types::TICKET_RESOLVED => "Resolved this ticket".to_string(),
        action_types::TICKET_CLOSED => "Closed this ticket".to_string(),
        action_types::PRIORITY_CHANGED => format!(
            "Changed priority from {} to {}",
            field(details, "old_priority"),
            field(details, "new_priority")
        ),
        action_types::TECHNICIAN_ASSIGN => {
            let name = field(details, "technician_name");
            if details.get("is_primary").and_then(Value::as_bool) == Some(true) {
                format!("Assigned {name} to this ticket as primary")
            } else {
                format!("Assigned {name} to this ticket")
            }
        }
        action_types::TECHNICIAN_REMOVE => format!(
            "Removed {} from this ticket",
            field(details, "technician_name")
        ),
        action_types::TECHNICIAN_COMPLETE => format!(
            "{} completed their work",
            field(details, "technician_name")
        ),
        action_types::COMMENT_ADDED => "Added a comment".to_string(),
        action_types::ROLE_CHANGED => format!(
            "Changed role of {} from {} to {}",
            field(details, "user_name"),
            field(details, "old_role"),
            field(details, "new_role")
        ),
        action_types::USER_ACTIVATED => format!("Activated {}", field(details, "user_name")),
        action_types::USER_DEACTIVATED => {
            format!("Deactivated {}", field(details, "user_name"))
        }
        action_types::SLA_POLICY_UPDATED => format!(
            "Set {} priority resolution time to {} hours",
            field(details, "priority"),
            field(details, "resolution_hours")
        ),
        other => format!("Performed {other}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
