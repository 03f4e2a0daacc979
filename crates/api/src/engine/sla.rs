//! Resolution-window policies per priority.

use helpdesk_core::access::{can_configure_sla, require};
use helpdesk_core::activity::{action_types, target_types};
use helpdesk_core::permissions::Permission;
use helpdesk_core::sla::validate_resolution_hours;
use helpdesk_core::ticket::TicketPriority;
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::sla_policy::SlaPolicy;
use helpdesk_db::store::TicketStore;
use serde_json::json;

use super::Caller;
use crate::error::AppResult;

pub async fn list_policies(store: &dyn TicketStore) -> AppResult<Vec<SlaPolicy>> {
    Ok(store.list_sla_policies().await?)
}

/// Set the resolution window for `priority`. Only tickets created
/// afterwards pick up the new window.
pub async fn update_policy(
    store: &dyn TicketStore,
    caller: &Caller,
    priority: TicketPriority,
    resolution_hours: i32,
) -> AppResult<SlaPolicy> {
    require(can_configure_sla(caller.role), Permission::ConfigureSla)?;
    validate_resolution_hours(resolution_hours)?;

    let previous = store.find_sla_policy(priority.as_str()).await?;
    let log = NewActivityLog::standalone(
        caller.user_id,
        action_types::SLA_POLICY_UPDATED,
        target_types::SLA_POLICY,
        None,
        json!({
            "priority": priority.as_str(),
            "resolution_hours": resolution_hours,
            "old_resolution_hours": previous.map(|p| p.resolution_hours),
        }),
    );
    let policy = store
        .upsert_sla_policy(priority.as_str(), resolution_hours, &log)
        .await?;

    tracing::info!(
        %priority,
        resolution_hours,
        updated_by = caller.user_id,
        "SLA policy updated"
    );
    Ok(policy)
}
