//! Handlers for ticket assignees.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::types::DbId;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::engine::assignment::{self, NewAssignment};
use crate::engine::Caller;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AssignRequest {
    #[validate(range(min = 1))]
    pub user_id: DbId,
    #[serde(default)]
    pub is_primary: bool,
    #[validate(length(max = 5000))]
    pub work_notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    #[validate(length(max = 5000))]
    pub work_notes: Option<String>,
}

/// GET /tickets/{id}/assignees
pub async fn list_assignees(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(ticket_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let assignees = assignment::list_assignees(state.store.as_ref(), &caller, ticket_id).await?;
    Ok(Json(DataResponse { data: assignees }))
}

/// POST /tickets/{id}/assignees
///
/// 409 when the technician is already assigned, 400 `INVALID_ROLE` when the
/// target user is not a technician.
pub async fn assign(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(ticket_id): AppPath<DbId>,
    AppJson(input): AppJson<AssignRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let caller = Caller::from(&user);
    let assignee = assignment::assign(
        state.store.as_ref(),
        &caller,
        ticket_id,
        NewAssignment {
            user_id: input.user_id,
            is_primary: input.is_primary,
            work_notes: input.work_notes,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignee })))
}

/// DELETE /tickets/{id}/assignees/{user_id}
pub async fn unassign(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath((ticket_id, user_id)): AppPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    assignment::unassign(state.store.as_ref(), &caller, ticket_id, user_id).await?;
    Ok(Json(DataResponse {
        data: json!({ "ticket_id": ticket_id, "user_id": user_id, "removed": true }),
    }))
}

/// PUT /tickets/{id}/assignees/{user_id}/complete
pub async fn complete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath((ticket_id, user_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CompleteRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let caller = Caller::from(&user);
    let assignee = assignment::complete_assignment(
        state.store.as_ref(),
        &caller,
        ticket_id,
        user_id,
        input.work_notes,
    )
    .await?;
    Ok(Json(DataResponse { data: assignee }))
}
