//! Invitation notification collaborator.

use serde::Serialize;

/// Everything needed to tell a new hire about their invitation.
#[derive(Debug, Clone)]
pub struct InvitationNotice {
    pub to_email: String,
    pub first_name: String,
    pub company_name: String,
    /// Deep link embedding the invitation token.
    pub link: String,
    pub expires_in_hours: i64,
}

/// Error raised while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Outcome reported back to the inviting admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    /// No delivery channel is configured.
    Skipped,
}

#[async_trait::async_trait]
pub trait InvitationNotifier: Send + Sync {
    async fn send_invitation(&self, notice: &InvitationNotice) -> Result<DeliveryStatus, NotifyError>;
}

/// Build the invitation deep link for `token`.
pub fn invitation_link(base: &str, token: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}token={token}")
}
