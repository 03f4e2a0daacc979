//! Route definitions for SLA policies.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::sla;
use crate::state::AppState;

/// SLA routes mounted at `/sla`.
///
/// ```text
/// GET /policies              -> list_policies
/// PUT /policies/{priority}   -> update_policy   (CONFIGURE_SLA)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/policies", get(sla::list_policies))
        .route("/policies/{priority}", put(sla::update_policy))
}
