//! Route definitions for user administration.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// User routes mounted at `/users`.
///
/// ```text
/// GET /technicians   -> list_technicians   (ASSIGN_TICKET)
/// PUT /{id}/role     -> change_role        (MANAGE_USERS)
/// PUT /{id}/active   -> set_active         (MANAGE_USERS)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/technicians", get(users::list_technicians))
        .route("/{id}/role", put(users::change_role))
        .route("/{id}/active", put(users::set_active))
}
