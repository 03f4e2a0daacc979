//! Handlers for ticket comments.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use crate::engine::{comments, Caller};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

/// GET /tickets/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(ticket_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let items = comments::list_comments(state.store.as_ref(), &caller, ticket_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /tickets/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(ticket_id): AppPath<DbId>,
    AppJson(input): AppJson<AddCommentRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let caller = Caller::from(&user);
    let comment =
        comments::add_comment(state.store.as_ref(), &caller, ticket_id, input.content).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}
