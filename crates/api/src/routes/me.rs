use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Caller routes mounted at `/me`.
pub fn router() -> Router<AppState> {
    Router::new().route("/permissions", get(me::permissions))
}
