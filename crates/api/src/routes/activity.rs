//! Route definitions for the cross-ticket activity feed.

use axum::routing::get;
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Activity routes mounted at `/activity-logs`.
///
/// ```text
/// GET /recent?limit=N   -> list_recent
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/recent", get(activity::list_recent))
}
