// =============================================================================
// Notification Dispatcher
// =============================================================================
//
// Delivery failures are caught here and turned into a `DispatchStatus`; they
// never reach back into the recommendation that was already computed.

pub mod message;
pub mod smtp;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;

pub use message::Notification;
pub use smtp::SmtpNotifier;

/// Outbound transport for alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Address the alert goes to, for reporting.
    fn recipient(&self) -> String;

    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// What happened to the alert of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchStatus {
    Sent { recipient: String },
    Failed { reason: String },
    Skipped,
}

impl std::fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent { recipient } => write!(f, "Trade signal sent to {recipient}"),
            Self::Failed { reason } => write!(f, "Failed to send notification: {reason}"),
            Self::Skipped => write!(f, "Notification skipped"),
        }
    }
}

/// Send `notification`, reporting rather than propagating any failure.
pub async fn dispatch(notifier: &dyn Notifier, notification: &Notification) -> DispatchStatus {
    match notifier.send(notification).await {
        Ok(()) => {
            let recipient = notifier.recipient();
            info!(%recipient, subject = %notification.subject, "notification sent");
            DispatchStatus::Sent { recipient }
        }
        Err(e) => {
            warn!(error = %e, "notification dispatch failed; results are unaffected");
            DispatchStatus::Failed {
                reason: e.to_string(),
            }
        }
    }
}
