//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller identity from a JWT Bearer token.
//! - [`rbac::RequireAuth`] -- Requires any authenticated caller.
//! - [`rbac::RequirePermission`] -- Requires a permission from the role table.

pub mod auth;
pub mod rbac;
