//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - Where the record is mutable, a patch DTO

pub mod activity_log;
pub mod comment;
pub mod sla_policy;
pub mod ticket;
pub mod ticket_assignee;
pub mod user;
