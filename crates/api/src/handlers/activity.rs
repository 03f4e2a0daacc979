//! Handlers for the activity log.
//!
//! Read-only: entries are written by the operations they record.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::types::DbId;

use crate::engine::{activity, Caller};
use crate::error::AppResult;
use crate::extract::{AppPath, AppQuery};
use crate::middleware::rbac::RequireAuth;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /tickets/{id}/activity-logs
pub async fn list_for_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(ticket_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let entries = activity::list_for_ticket(state.store.as_ref(), &caller, ticket_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /activity-logs/recent?limit=N
pub async fn list_recent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppQuery(params): AppQuery<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let entries = activity::list_recent(
        state.store.as_ref(),
        &caller,
        params.limit,
        state.config.recent_activity_limit,
    )
    .await?;
    Ok(Json(DataResponse { data: entries }))
}
