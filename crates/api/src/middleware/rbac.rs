//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! hold the required permission in the static table. Ticket-scoped decisions
//! (assignment, ownership) need the ticket and are made by the engine.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use helpdesk_core::access::require;
use helpdesk_core::permissions::{has_permission, Permission};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires any authenticated user (any valid token).
///
/// ```ignore
/// async fn any_authed(RequireAuth(user): RequireAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

/// A permission a route requires, named at the type level.
pub trait PermissionGate: Send + Sync + 'static {
    const PERMISSION: Permission;
}

macro_rules! permission_gates {
    ($($gate:ident => $permission:ident),* $(,)?) => {
        $(
            pub struct $gate;

            impl PermissionGate for $gate {
                const PERMISSION: Permission = Permission::$permission;
            }
        )*
    };
}

permission_gates! {
    CanAssign => AssignTicket,
    CanManageUsers => ManageUsers,
    CanConfigureSla => ConfigureSla,
}

/// Requires the permission named by `G`. Rejects with 403 naming the
/// permission otherwise.
///
/// ```ignore
/// async fn admin_users(RequirePermission(user, _): RequirePermission<CanManageUsers>) {}
/// ```
pub struct RequirePermission<G: PermissionGate>(pub AuthUser, pub PhantomData<G>);

impl<G: PermissionGate> FromRequestParts<AppState> for RequirePermission<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require(has_permission(user.role(), G::PERMISSION), G::PERMISSION)?;
        Ok(RequirePermission(user, PhantomData))
    }
}
