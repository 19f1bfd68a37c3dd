use std::sync::Arc;

use hrflow_core::clock::Clock;
use hrflow_core::notification::InvitationNotifier;
use hrflow_core::storage::ObjectStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hrflow_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Where uploaded documents and profile pictures are written.
    pub storage: Arc<dyn ObjectStorage>,
    /// Delivers onboarding invitations.
    pub notifier: Arc<dyn InvitationNotifier>,
    /// Source of "now" for invitation expiry and timesheet periods.
    pub clock: Arc<dyn Clock>,
}
