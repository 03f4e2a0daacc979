//! Handlers for ticket CRUD and state changes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use helpdesk_core::types::{DbId, Timestamp};
use serde::Deserialize;
use validator::Validate;

use super::{parse_priority, parse_status};
use crate::engine::tickets::{NewTicket, TicketPatch};
use crate::engine::{status, tickets, Caller};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub due_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePriorityRequest {
    #[validate(length(min = 1))]
    pub priority: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let items = tickets::list_tickets(state.store.as_ref(), &caller, Utc::now()).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(input): AppJson<CreateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let priority = input.priority.as_deref().map(parse_priority).transpose()?;

    let caller = Caller::from(&user);
    let ticket = tickets::create_ticket(
        state.store.as_ref(),
        &caller,
        NewTicket {
            title: input.title,
            description: input.description,
            priority,
            due_at: input.due_at,
        },
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /tickets/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let detail = tickets::get_ticket(state.store.as_ref(), &caller, id, Utc::now()).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PATCH /tickets/{id}
pub async fn update_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let caller = Caller::from(&user);
    let patch = TicketPatch {
        title: input.title,
        description: input.description,
        due_at: input.due_at,
    };
    let ticket = tickets::update_ticket(state.store.as_ref(), &caller, id, patch).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /tickets/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let caller = Caller::from(&user);
    tickets::delete_ticket(state.store.as_ref(), &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /tickets/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ChangeStatusRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let to = parse_status(&input.status)?;

    let caller = Caller::from(&user);
    let ticket = status::change_status(state.store.as_ref(), &caller, id, to, Utc::now()).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// PUT /tickets/{id}/priority
pub async fn change_priority(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ChangePriorityRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let to = parse_priority(&input.priority)?;

    let caller = Caller::from(&user);
    let ticket = status::change_priority(state.store.as_ref(), &caller, id, to).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// GET /tickets/{id}/permissions
pub async fn ticket_permissions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let caller = Caller::from(&user);
    let permissions = tickets::permissions_for_ticket(state.store.as_ref(), &caller, id).await?;
    Ok(Json(DataResponse { data: permissions }))
}
