//! Authentication primitives.
//!
//! Sessions are issued elsewhere; this server only validates the HS256
//! access tokens it is handed. [`jwt::generate_access_token`] exists for
//! tests and operator tooling.

pub mod jwt;
