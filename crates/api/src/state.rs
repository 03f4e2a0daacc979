use std::sync::Arc;

use helpdesk_db::store::TicketStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Data access for the workflow engine.
    pub store: Arc<dyn TicketStore>,
    pub config: Arc<ServerConfig>,
}
