//! Domain rules for the helpdesk ticket workflow.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` crate
//! persists what these rules produce and the `api` crate wires them to
//! callers.

pub mod access;
pub mod activity;
pub mod assignment;
pub mod error;
pub mod permissions;
pub mod roles;
pub mod sla;
pub mod ticket;
pub mod types;
