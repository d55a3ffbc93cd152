// =============================================================================
// SMTP notifier — STARTTLS submission to a single fixed recipient
// =============================================================================
//
// SECURITY: the relay password is never logged; `Debug` redacts it.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

use crate::error::{PipelineError, Result};
use crate::notify::{Notification, Notifier};
use crate::runtime_config::{RuntimeConfig, Secrets};

pub struct SmtpNotifier {
    from: Mailbox,
    to: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    relay: String,
}

impl SmtpNotifier {
    /// Build the transport.  Addresses are parsed here so a malformed
    /// username or recipient fails before any message is composed.
    pub fn new(config: &RuntimeConfig, secrets: &Secrets) -> Result<Self> {
        let from: Mailbox = secrets
            .email_username
            .parse()
            .map_err(|e| PipelineError::Config(format!("invalid EMAIL_USERNAME address: {e}")))?;
        let to: Mailbox = secrets
            .email_recipient
            .parse()
            .map_err(|e| PipelineError::Config(format!("invalid EMAIL_RECIPIENT address: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| PipelineError::Config(format!("invalid SMTP relay {}: {e}", config.smtp_host)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                secrets.email_username.clone(),
                secrets.email_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.request_timeout_secs)))
            .build();

        let relay = format!("{}:{}", config.smtp_host, config.smtp_port);
        debug!(%relay, "SmtpNotifier initialised");

        Ok(Self {
            from,
            to,
            transport,
            relay,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn recipient(&self) -> String {
        self.to.to_string()
    }

    #[instrument(skip_all, name = "smtp::send", fields(relay = %self.relay))]
    async fn send(&self, notification: &Notification) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| PipelineError::Dispatch(format!("failed to build message: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| PipelineError::Dispatch(e.to_string()))?;

        Ok(())
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .field("relay", &self.relay)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(username: &str, recipient: &str) -> Secrets {
        Secrets {
            api_key: "k".into(),
            email_username: username.into(),
            email_password: "hunter2".into(),
            email_recipient: recipient.into(),
        }
    }

    #[tokio::test]
    async fn builds_with_valid_addresses() {
        let notifier = SmtpNotifier::new(
            &RuntimeConfig::default(),
            &secrets("bot@example.com", "trader@example.com"),
        )
        .unwrap();
        assert_eq!(notifier.recipient(), "trader@example.com");
        let dbg = format!("{notifier:?}");
        assert!(dbg.contains("smtp.gmail.com:587"));
        assert!(!dbg.contains("hunter2"));
    }

    #[tokio::test]
    async fn rejects_malformed_recipient() {
        let err = SmtpNotifier::new(
            &RuntimeConfig::default(),
            &secrets("bot@example.com", "not an address"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        assert!(err.to_string().contains("EMAIL_RECIPIENT"));
    }
}
