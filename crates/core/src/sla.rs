//! SLA deadline tracking.
//!
//! [`evaluate`] is a pure function of `(due_at, status, sla_breach, now)`;
//! it never mutates a ticket. Resolution-hour policies per priority feed the
//! default `due_at` on ticket creation.

use chrono::{Duration, TimeDelta};
use serde::Serialize;

use crate::error::CoreError;
use crate::ticket::{TicketPriority, TicketStatus};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Below this much remaining time a ticket is in `DANGER`.
pub const DANGER_THRESHOLD_HOURS: i64 = 2;

/// Below this much remaining time a ticket is in `WARNING`.
pub const WARNING_THRESHOLD_HOURS: i64 = 8;

/// Bounds for a configurable resolution window (one hour to one year).
pub const MIN_RESOLUTION_HOURS: i32 = 1;
pub const MAX_RESOLUTION_HOURS: i32 = 8_760;

// ---------------------------------------------------------------------------
// Indicator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaState {
    Good,
    Warning,
    Danger,
    Breached,
}

impl SlaState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Warning => "WARNING",
            Self::Danger => "DANGER",
            Self::Breached => "BREACHED",
        }
    }
}

/// SLA status of one ticket at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlaIndicator {
    pub state: SlaState,
    /// Signed minutes until `due_at`; negative once overdue.
    pub remaining_minutes: i64,
    /// e.g. `"1h 30m remaining"` or `"0h 5m overdue"`.
    pub remaining_text: String,
}

/// Derive the SLA indicator for a ticket.
///
/// Returns `None` when the ticket has no deadline or is resolved/closed.
pub fn evaluate(
    due_at: Option<Timestamp>,
    status: TicketStatus,
    sla_breach: bool,
    now: Timestamp,
) -> Option<SlaIndicator> {
    let due_at = due_at?;
    if status.suppresses_sla() {
        return None;
    }

    let remaining = due_at - now;
    let state = if sla_breach || remaining < TimeDelta::zero() {
        SlaState::Breached
    } else if remaining < Duration::hours(DANGER_THRESHOLD_HOURS) {
        SlaState::Danger
    } else if remaining < Duration::hours(WARNING_THRESHOLD_HOURS) {
        SlaState::Warning
    } else {
        SlaState::Good
    };

    Some(SlaIndicator {
        state,
        remaining_minutes: remaining.num_minutes(),
        remaining_text: format_remaining(remaining),
    })
}

/// Render a signed duration as whole hours and minutes, floor-rounded on its
/// magnitude.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let overdue = remaining < TimeDelta::zero();
    let total_minutes = remaining.num_seconds().unsigned_abs() / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if overdue {
        format!("{hours}h {minutes}m overdue")
    } else {
        format!("{hours}h {minutes}m remaining")
    }
}

/// Whether `now` is past the deadline.
pub fn is_overdue(due_at: Option<Timestamp>, now: Timestamp) -> bool {
    due_at.is_some_and(|due| now > due)
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Built-in resolution windows, matching the seed rows in
/// `20260301000006_create_sla_policies.sql`.
pub fn default_resolution_hours(priority: TicketPriority) -> i32 {
    match priority {
        TicketPriority::Critical => 4,
        TicketPriority::High => 8,
        TicketPriority::Medium => 24,
        TicketPriority::Low => 72,
    }
}

pub fn compute_due_at(created_at: Timestamp, resolution_hours: i32) -> Timestamp {
    created_at + Duration::hours(i64::from(resolution_hours))
}

pub fn validate_resolution_hours(hours: i32) -> Result<(), CoreError> {
    if (MIN_RESOLUTION_HOURS..=MAX_RESOLUTION_HOURS).contains(&hours) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "resolution_hours must be between {MIN_RESOLUTION_HOURS} and {MAX_RESOLUTION_HOURS}, got {hours}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn state_at(offset: Duration) -> SlaState {
        evaluate(Some(now() + offset), TicketStatus::Open, false, now())
            .unwrap()
            .state
    }

    // -----------------------------------------------------------------------
    // Suppression
    // -----------------------------------------------------------------------

    #[test]
    fn no_due_date_means_no_indicator() {
        assert_eq!(evaluate(None, TicketStatus::Open, true, now()), None);
    }

    #[test]
    fn resolved_overdue_ticket_is_suppressed() {
        let due = now() - Duration::hours(5);
        assert_eq!(evaluate(Some(due), TicketStatus::Resolved, true, now()), None);
        assert_eq!(evaluate(Some(due), TicketStatus::Closed, false, now()), None);
    }

    // -----------------------------------------------------------------------
    // Threshold boundaries
    // -----------------------------------------------------------------------

    #[test]
    fn ninety_minutes_left_is_danger() {
        assert_eq!(state_at(Duration::minutes(90)), SlaState::Danger);
    }

    #[test]
    fn one_minute_overdue_is_breached_without_flag() {
        assert_eq!(state_at(Duration::minutes(-1)), SlaState::Breached);
    }

    #[test]
    fn exactly_due_now_is_danger_not_breached() {
        assert_eq!(state_at(Duration::zero()), SlaState::Danger);
    }

    #[test]
    fn one_second_overdue_is_breached() {
        assert_eq!(state_at(Duration::seconds(-1)), SlaState::Breached);
    }

    #[test]
    fn two_hour_boundary() {
        assert_eq!(
            state_at(Duration::hours(2) - Duration::seconds(1)),
            SlaState::Danger
        );
        assert_eq!(state_at(Duration::hours(2)), SlaState::Warning);
    }

    #[test]
    fn eight_hour_boundary() {
        assert_eq!(
            state_at(Duration::hours(8) - Duration::seconds(1)),
            SlaState::Warning
        );
        assert_eq!(state_at(Duration::hours(8)), SlaState::Good);
    }

    #[test]
    fn breach_flag_overrides_remaining_time() {
        let due = now() + Duration::days(3);
        let indicator = evaluate(Some(due), TicketStatus::InProgress, true, now()).unwrap();
        assert_eq!(indicator.state, SlaState::Breached);
        assert_eq!(indicator.remaining_text, "72h 0m remaining");
    }

    #[test]
    fn escalated_tickets_are_still_tracked() {
        let due = now() + Duration::hours(3);
        let indicator = evaluate(Some(due), TicketStatus::OnEscalation, false, now()).unwrap();
        assert_eq!(indicator.state, SlaState::Warning);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let due = Some(now() + Duration::minutes(125));
        let a = evaluate(due, TicketStatus::Open, false, now());
        let b = evaluate(due, TicketStatus::Open, false, now());
        assert_eq!(a, b);
    }

    // -----------------------------------------------------------------------
    // Formatting
    // -----------------------------------------------------------------------

    #[test]
    fn formats_hours_and_minutes_floor_rounded() {
        let d = Duration::minutes(90) + Duration::seconds(59);
        assert_eq!(format_remaining(d), "1h 30m remaining");
    }

    #[test]
    fn formats_overdue_magnitude() {
        assert_eq!(format_remaining(Duration::minutes(-1)), "0h 1m overdue");
        assert_eq!(
            format_remaining(-(Duration::hours(26) + Duration::minutes(5))),
            "26h 5m overdue"
        );
    }

    #[test]
    fn indicator_carries_signed_minutes() {
        let indicator =
            evaluate(Some(now() - Duration::minutes(30)), TicketStatus::Open, false, now())
                .unwrap();
        assert_eq!(indicator.remaining_minutes, -30);
        assert_eq!(indicator.remaining_text, "0h 30m overdue");
    }

    #[test]
    fn labels_match_serde() {
        for s in [
            SlaState::Good,
            SlaState::Warning,
            SlaState::Danger,
            SlaState::Breached,
        ] {
            assert_eq!(serde_json::to_value(s).unwrap(), s.label());
        }
    }

    // -----------------------------------------------------------------------
    // Policies
    // -----------------------------------------------------------------------

    #[test]
    fn default_windows_by_priority() {
        assert_eq!(default_resolution_hours(TicketPriority::Critical), 4);
        assert_eq!(default_resolution_hours(TicketPriority::Low), 72);
    }

    #[test]
    fn due_at_is_created_plus_window() {
        assert_eq!(compute_due_at(now(), 8), now() + Duration::hours(8));
    }

    #[test]
    fn resolution_hours_bounds() {
        assert!(validate_resolution_hours(1).is_ok());
        assert!(validate_resolution_hours(8_760).is_ok());
        assert!(validate_resolution_hours(0).is_err());
        assert!(validate_resolution_hours(8_761).is_err());
    }

    #[test]
    fn overdue_check() {
        assert!(is_overdue(Some(now() - Duration::seconds(1)), now()));
        assert!(!is_overdue(Some(now()), now()));
        assert!(!is_overdue(None, now()));
    }
}
