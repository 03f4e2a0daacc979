//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Read-only listings take `&PgPool`; methods that take part in a store
//! transaction accept any [`sqlx::PgExecutor`] so they run either on the
//! pool or inside `&mut *tx`.

pub mod activity_log_repo;
pub mod comment_repo;
pub mod sla_policy_repo;
pub mod ticket_assignee_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use comment_repo::CommentRepo;
pub use sla_policy_repo::SlaPolicyRepo;
pub use ticket_assignee_repo::TicketAssigneeRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
