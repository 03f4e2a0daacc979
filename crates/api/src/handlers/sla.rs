//! Handlers for SLA policy configuration.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::parse_priority;
use crate::engine::{sla, Caller};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::{CanConfigureSla, RequireAuth, RequirePermission};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePolicyRequest {
    #[validate(range(min = 1, max = 8760))]
    pub resolution_hours: i32,
}

/// GET /sla/policies
pub async fn list_policies(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<impl IntoResponse> {
    let policies = sla::list_policies(state.store.as_ref()).await?;
    Ok(Json(DataResponse { data: policies }))
}

/// PUT /sla/policies/{priority}
pub async fn update_policy(
    State(state): State<AppState>,
    RequirePermission(user, _): RequirePermission<CanConfigureSla>,
    AppPath(priority): AppPath<String>,
    AppJson(input): AppJson<UpdatePolicyRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let priority = parse_priority(&priority)?;

    let caller = Caller::from(&user);
    let policy =
        sla::update_policy(state.store.as_ref(), &caller, priority, input.resolution_hours)
            .await?;
    Ok(Json(DataResponse { data: policy }))
}
