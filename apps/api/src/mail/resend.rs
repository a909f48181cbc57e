//! Hosted transactional-email API transport (Resend `/emails`).
//!
//! Same contract as the SMTP transport: one POST per message, no retries,
//! the provider's id is returned as the message id.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigError, DispatchError, Dispatcher, MessageId, OutgoingMail};
use crate::config::HostedApiSettings;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ApiAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiAttachment<'a> {
    filename: &'a str,
    /// Base64 of the raw file bytes.
    content: String,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct ResendDispatcher {
    client: Client,
    api_key: String,
    endpoint: String,
    budget: Duration,
}

impl ResendDispatcher {
    pub fn new(settings: &HostedApiSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(settings.timeouts.connect)
            .timeout(settings.timeouts.total())
            .build()
            .map_err(|e| ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/emails", settings.base_url.trim_end_matches('/')),
            budget: settings.timeouts.total(),
        })
    }
}

fn request_body(mail: &OutgoingMail) -> SendEmailRequest<'_> {
    SendEmailRequest {
        from: &mail.from,
        to: [&mail.to],
        reply_to: &mail.reply_to,
        subject: &mail.subject,
        text: &mail.text,
        html: mail.html.as_deref(),
        attachments: mail
            .attachment
            .iter()
            .map(|a| ApiAttachment {
                filename: &a.filename,
                content: base64::engine::general_purpose::STANDARD.encode(&a.content),
                content_type: &a.mime_type,
            })
            .collect(),
    }
}

#[async_trait]
impl Dispatcher for ResendDispatcher {
    fn transport_name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<MessageId, DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(mail))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout(self.budget)
                } else {
                    DispatchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(DispatchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendEmailResponse = response.json().await?;
        debug!("Mail API accepted message {}", sent.id);
        Ok(MessageId(sent.id))
    }
}
