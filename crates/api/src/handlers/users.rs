//! Handlers for user administration.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use super::parse_role;
use crate::engine::{users, Caller};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::{CanAssign, CanManageUsers, RequirePermission};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    #[validate(length(min = 1))]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// GET /users/technicians
pub async fn list_technicians(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<CanAssign>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let technicians = users::list_technicians(state.store.as_ref(), &caller).await?;
    Ok(Json(DataResponse { data: technicians }))
}

/// PUT /users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    RequirePermission(admin, _): RequirePermission<CanManageUsers>,
    AppPath(user_id): AppPath<DbId>,
    AppJson(input): AppJson<ChangeRoleRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let role = parse_role(&input.role)?;

    let caller = Caller::from(&admin);
    let user = users::change_role(state.store.as_ref(), &caller, user_id, role).await?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /users/{id}/active
pub async fn set_active(
    State(state): State<AppState>,
    RequirePermission(admin, _): RequirePermission<CanManageUsers>,
    AppPath(user_id): AppPath<DbId>,
    AppJson(input): AppJson<SetActiveRequest>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&admin);
    let user = users::set_active(state.store.as_ref(), &caller, user_id, input.is_active).await?;
    Ok(Json(DataResponse { data: user }))
}
