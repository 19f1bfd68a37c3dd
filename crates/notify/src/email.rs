//! Invitation delivery via SMTP.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport to send the
//! onboarding invitation as a multipart (plain text + HTML) message.
//! Configuration is loaded from environment variables; if `SMTP_HOST` is not
//! set, [`EmailConfig::from_env`] returns `None` and no mailer should be
//! constructed.

use hrflow_core::notification::{
    DeliveryStatus, InvitationNotice, InvitationNotifier, NotifyError,
};

/// Subject line of every invitation email.
pub const INVITATION_SUBJECT: &str = "Your HRFlow Onboarding Invitation";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

impl From<EmailError> for NotifyError {
    fn from(err: EmailError) -> Self {
        NotifyError::Delivery(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@hrflow.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      | -                       |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@hrflow.local`  |
    /// | `SMTP_USER`     | no       | -                       |
    /// | `SMTP_PASSWORD` | no       | -                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok().filter(|u| !u.is_empty()),
            smtp_password: std::env::var("SMTP_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }
}

// ---------------------------------------------------------------------------
// Message bodies
// ---------------------------------------------------------------------------

fn expiry_sentence(hours: i64) -> String {
    format!("This link will expire in {hours} hours.")
}

/// Plain-text body of the invitation.
pub fn render_text(notice: &InvitationNotice) -> String {
    format!(
        "Hello {name},\n\n\
         You have been invited to join {company} on HRFlow.\n\
         Open the link below to start your onboarding:\n\n\
         {link}\n\n\
         {expiry}\n",
        name = notice.first_name,
        company = notice.company_name,
        link = notice.link,
        expiry = expiry_sentence(notice.expires_in_hours),
    )
}

/// HTML body of the invitation.
pub fn render_html(notice: &InvitationNotice) -> String {
    format!(
        "<html><body>\
         <p>Hello {name},</p>\
         <p>You have been invited to join <strong>{company}</strong> on HRFlow.</p>\
         <p><a href=\"{link}\">Start your onboarding</a></p>\
         <p>{expiry}</p>\
         </body></html>",
        name = escape_html(&notice.first_name),
        company = escape_html(&notice.company_name),
        link = escape_html(&notice.link),
        expiry = expiry_sentence(notice.expires_in_hours),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// EmailNotifier
// ---------------------------------------------------------------------------

/// Sends invitation emails via SMTP.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build and send the invitation message.
    pub async fn deliver(&self, notice: &InvitationNotice) -> Result<(), EmailError> {
        use lettre::{
            message::MultiPart, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(notice.to_email.parse()?)
            .subject(INVITATION_SUBJECT)
            .multipart(MultiPart::alternative_plain_html(
                render_text(notice),
                render_html(notice),
            ))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = %notice.to_email, "Invitation email sent");
        Ok(())
    }
}

#[async_trait::async_trait]
impl InvitationNotifier for EmailNotifier {
    async fn send_invitation(
        &self,
        notice: &InvitationNotice,
    ) -> Result<DeliveryStatus, NotifyError> {
        self.deliver(notice).await?;
        Ok(DeliveryStatus::Sent)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
