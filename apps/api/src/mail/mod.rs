//! Mail Dispatcher — the only place outbound mail leaves the process.
//!
//! Handlers depend on the [`Dispatcher`] trait; the concrete transport is chosen
//! once at startup from [`MailConfig`] and carried in `AppState` as
//! `Arc<dyn Dispatcher>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::{MailConfig, TransportConfig};
use crate::models::submission::Attachment;

pub mod resend;
pub mod smtp;

pub use resend::ResendDispatcher;
pub use smtp::SmtpDispatcher;

/// Identifier handed back by the transport for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully composed message, addressed and ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// `"Display Name" <address>` or a bare address.
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub attachment: Option<Attachment>,
}

/// The transport configuration is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Raised before any network access.
    #[error("{0}")]
    NotConfigured(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("Mail transport timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// One interface over every way of delivering mail.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Short label for logs.
    fn transport_name(&self) -> &'static str;

    async fn send(&self, mail: &OutgoingMail) -> Result<MessageId, DispatchError>;
}

/// Stands in for a real transport when configuration is incomplete, so the
/// service still starts and every relay request fails fast with a 500.
pub struct UnconfiguredDispatcher {
    reason: String,
}

impl UnconfiguredDispatcher {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Dispatcher for UnconfiguredDispatcher {
    fn transport_name(&self) -> &'static str {
        "unconfigured"
    }

    async fn send(&self, _mail: &OutgoingMail) -> Result<MessageId, DispatchError> {
        Err(DispatchError::NotConfigured(self.reason.clone()))
    }
}

/// Picks and builds the transport described by `config`.
pub fn build_dispatcher(config: &MailConfig) -> Result<Arc<dyn Dispatcher>, ConfigError> {
    match &config.transport {
        TransportConfig::Smtp(settings) => {
            let (Some(user), Some(pass)) = (&settings.user, &settings.pass) else {
                return Err(ConfigError(
                    "SMTP credentials missing (SMTP_USER / SMTP_PASS)".to_string(),
                ));
            };
            let dispatcher = SmtpDispatcher::new(settings, user, pass)?;
            Ok(Arc::new(dispatcher))
        }
        TransportConfig::HostedApi(settings) => {
            if config.sender_address().is_none() {
                return Err(ConfigError(
                    "FROM_EMAIL must be set when RESEND_API_KEY is used".to_string(),
                ));
            }
            Ok(Arc::new(ResendDispatcher::new(settings)?))
        }
    }
}

/// Like [`build_dispatcher`], but degrades to an [`UnconfiguredDispatcher`].
pub fn build_dispatcher_or_unconfigured(config: &MailConfig) -> Arc<dyn Dispatcher> {
    match build_dispatcher(config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::warn!("Mail transport not configured: {e}");
            Arc::new(UnconfiguredDispatcher::new(e.0))
        }
    }
}

/// Domain part of an address, tolerating a `"Name" <addr>` wrapper.
pub(crate) fn address_domain(address: &str) -> Option<&str> {
    let bare = match (address.rfind('<'), address.rfind('>')) {
        (Some(start), Some(end)) if start < end => &address[start + 1..end],
        _ => address,
    };
    bare.rsplit_once('@')
        .map(|(_, domain)| domain.trim())
        .filter(|domain| !domain.is_empty())
}
