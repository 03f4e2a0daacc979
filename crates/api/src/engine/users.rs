//! User administration: technician directory, role changes, activation.
//!
//! Users are never deleted; deactivation is the only removal.

use helpdesk_core::access::{can_assign, can_manage_users, require};
use helpdesk_core::activity::{action_types, target_types};
use helpdesk_core::assignment::ASSIGNABLE_ROLE;
use helpdesk_core::error::CoreError;
use helpdesk_core::permissions::Permission;
use helpdesk_core::roles::Role;
use helpdesk_core::types::DbId;
use helpdesk_db::models::activity_log::NewActivityLog;
use helpdesk_db::models::user::User;
use helpdesk_db::store::TicketStore;
use serde_json::json;

use super::{load_user, Caller};
use crate::error::AppResult;

/// Active technicians, for assignment pickers.
pub async fn list_technicians(store: &dyn TicketStore, caller: &Caller) -> AppResult<Vec<User>> {
    require(can_assign(caller.role), Permission::AssignTicket)?;
    Ok(store
        .list_users(Some(ASSIGNABLE_ROLE.as_str()), true)
        .await?)
}

fn user_gone(id: DbId) -> CoreError {
    CoreError::NotFound { entity: "User", id }
}

pub async fn change_role(
    store: &dyn TicketStore,
    caller: &Caller,
    user_id: DbId,
    role: Role,
) -> AppResult<User> {
    require(can_manage_users(caller.role), Permission::ManageUsers)?;
    if user_id == caller.user_id {
        return Err(CoreError::Forbidden("You cannot change your own role".to_string()).into());
    }

    let user = load_user(store, user_id).await?;
    if user.role == role.as_str() {
        return Ok(user);
    }
    // Only technicians may hold assignments.
    if role != ASSIGNABLE_ROLE {
        let held = store.list_assignments_for_user(user.id).await?;
        if !held.is_empty() {
            let tickets: Vec<String> = held.iter().map(|a| a.ticket_id.to_string()).collect();
            return Err(CoreError::Conflict(format!(
                "{} is still assigned to tickets {}; unassign them before changing their role",
                user.full_name,
                tickets.join(", ")
            ))
            .into());
        }
    }

    let log = NewActivityLog::standalone(
        caller.user_id,
        action_types::ROLE_CHANGED,
        target_types::USER,
        Some(user.id),
        json!({
            "user_name": user.full_name,
            "old_role": user.role,
            "new_role": role.as_str(),
        }),
    );
    let updated = store
        .update_user_role(user.id, role.as_str(), &log)
        .await?
        .ok_or_else(|| user_gone(user.id))?;

    tracing::info!(
        user_id = updated.id,
        changed_by = caller.user_id,
        old_role = %user.role,
        new_role = %role,
        "User role changed"
    );
    Ok(updated)
}

pub async fn set_active(
    store: &dyn TicketStore,
    caller: &Caller,
    user_id: DbId,
    is_active: bool,
) -> AppResult<User> {
    require(can_manage_users(caller.role), Permission::ManageUsers)?;
    if user_id == caller.user_id && !is_active {
        return Err(
            CoreError::Forbidden("You cannot deactivate your own account".to_string()).into(),
        );
    }

    let user = load_user(store, user_id).await?;
    if user.is_active == is_active {
        return Ok(user);
    }

    let action = if is_active {
        action_types::USER_ACTIVATED
    } else {
        action_types::USER_DEACTIVATED
    };
    let log = NewActivityLog::standalone(
        caller.user_id,
        action,
        target_types::USER,
        Some(user.id),
        json!({ "user_name": user.full_name }),
    );
    let updated = store
        .set_user_active(user.id, is_active, &log)
        .await?
        .ok_or_else(|| user_gone(user.id))?;

    tracing::info!(
        user_id = updated.id,
        changed_by = caller.user_id,
        is_active,
        "User activation changed"
    );
    Ok(updated)
}
