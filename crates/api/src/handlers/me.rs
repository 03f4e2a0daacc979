//! Handlers describing the current caller.

use axum::response::IntoResponse;
use axum::Json;
use helpdesk_core::access::global_permissions;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

/// GET /me/permissions
///
/// The caller's role and every capability that does not depend on a
/// particular ticket.
pub async fn permissions(RequireAuth(user): RequireAuth) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: global_permissions(user.role()),
    }))
}
