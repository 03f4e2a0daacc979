//! Request extractors whose rejections are [`AppError`]s.
//!
//! Thin wrappers over axum's `Json`, `Path` and `Query` so a malformed body,
//! path segment or query string answers 400 `BAD_REQUEST` in the usual
//! `{ "error", "code" }` envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
