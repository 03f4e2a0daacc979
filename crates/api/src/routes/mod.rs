pub mod activity;
pub mod health;
pub mod me;
pub mod sla;
pub mod tickets;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route requires a bearer token (enforced by handler extractors).
///
/// ```text
/// /me/permissions                                  global capability summary
///
/// /tickets                                         list, create
/// /tickets/{id}                                    get, patch, delete
/// /tickets/{id}/status                             change status (PUT)
/// /tickets/{id}/priority                           change priority (PUT)
/// /tickets/{id}/permissions                        per-ticket decisions
/// /tickets/{id}/assignees                          list, assign
/// /tickets/{id}/assignees/{user_id}                unassign (DELETE)
/// /tickets/{id}/assignees/{user_id}/complete       complete (PUT)
/// /tickets/{id}/comments                           list, add
/// /tickets/{id}/activity-logs                      ticket trail
///
/// /activity-logs/recent                            latest entries (?limit=)
///
/// /users/technicians                               active technicians
/// /users/{id}/role                                 change role (PUT)
/// /users/{id}/active                               activate / deactivate (PUT)
///
/// /sla/policies                                    list
/// /sla/policies/{priority}                         update (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/me", me::router())
        .nest("/tickets", tickets::router())
        .nest("/activity-logs", activity::router())
        .nest("/users", users::router())
        .nest("/sla", sla::router())
}
