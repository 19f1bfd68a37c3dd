//! Invitation notification delivery.
//!
//! [`notifier_from_env`] picks SMTP delivery when `SMTP_HOST` is configured
//! and falls back to [`LogNotifier`], which only records the invitation in
//! the log.

use std::sync::Arc;

use hrflow_core::notification::{
    DeliveryStatus, InvitationNotice, InvitationNotifier, NotifyError,
};

pub mod email;

pub use email::{EmailConfig, EmailNotifier};

/// Notifier used when no delivery channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl InvitationNotifier for LogNotifier {
    async fn send_invitation(
        &self,
        notice: &InvitationNotice,
    ) -> Result<DeliveryStatus, NotifyError> {
        tracing::info!(
            to = %notice.to_email,
            link = %notice.link,
            "SMTP not configured, invitation not emailed",
        );
        Ok(DeliveryStatus::Skipped)
    }
}

/// Build the notifier selected by the environment.
pub fn notifier_from_env() -> Arc<dyn InvitationNotifier> {
    match EmailConfig::from_env() {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP delivery enabled");
            Arc::new(EmailNotifier::new(config))
        }
        None => Arc::new(LogNotifier),
    }
}
