//! SMTP transport built on lettre.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment as MailAttachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{address_domain, ConfigError, DispatchError, Dispatcher, MessageId, OutgoingMail};
use crate::config::{Encryption, SmtpSettings, Timeouts};
use crate::models::submission::{Attachment, DEFAULT_ATTACHMENT_TYPE};

/// Pooled SMTP transport, created once at startup and shared by all requests.
#[derive(Clone)]
pub struct SmtpDispatcher {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    timeouts: Timeouts,
    host: String,
}

impl SmtpDispatcher {
    pub fn new(settings: &SmtpSettings, user: &str, pass: &str) -> Result<Self, ConfigError> {
        let builder = match settings.encryption() {
            Encryption::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
            Encryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            }
        }
        .map_err(|e| ConfigError(format!("Invalid SMTP_HOST '{}': {e}", settings.host)))?;

        // lettre applies one timeout to connect and to every command round-trip;
        // the whole send is additionally bounded by `Timeouts::total`.
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .timeout(Some(settings.timeouts.socket))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            timeouts: settings.timeouts,
            host: settings.host.clone(),
        })
    }
}

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    fn transport_name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<MessageId, DispatchError> {
        let message_id = generate_message_id(&mail.from);
        let message = build_message(mail, &message_id)?;

        let budget = self.timeouts.total();
        let response = tokio::time::timeout(budget, self.transport.send(message))
            .await
            .map_err(|_| DispatchError::Timeout(budget))?
            .map_err(|e| DispatchError::Smtp(e.to_string()))?;

        debug!(
            "SMTP {} accepted {message_id}: {}",
            self.host,
            response.code()
        );

        Ok(MessageId(message_id))
    }
}

/// `<uuid@sender-domain>`, the same shape mail clients generate.
fn generate_message_id(from: &str) -> String {
    let domain = address_domain(from).unwrap_or("localhost");
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, DispatchError> {
    raw.parse()
        .map_err(|_| DispatchError::InvalidAddress(raw.to_string()))
}

/// Renders an [`OutgoingMail`] as a MIME message.
///
/// Body shapes: plain text; text + HTML alternative; either of those wrapped in
/// `multipart/mixed` together with the attachment.
pub(crate) fn build_message(
    mail: &OutgoingMail,
    message_id: &str,
) -> Result<Message, DispatchError> {
    let builder = Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .to(parse_mailbox(&mail.to)?)
        .reply_to(parse_mailbox(&mail.reply_to)?)
        .subject(&mail.subject)
        .message_id(Some(message_id.to_string()));

    let text_part = || SinglePart::plain(mail.text.clone());
    let alternative =
        |html: &String| MultiPart::alternative_plain_html(mail.text.clone(), html.clone());

    let result = match (&mail.html, &mail.attachment) {
        (None, None) => builder.singlepart(text_part()),
        (Some(html), None) => builder.multipart(alternative(html)),
        (html, Some(attachment)) => {
            let part = attachment_part(attachment)?;
            let mixed = match html {
                Some(html) => MultiPart::mixed().multipart(alternative(html)),
                None => MultiPart::mixed().singlepart(text_part()),
            };
            builder.multipart(mixed.singlepart(part))
        }
    };

    result.map_err(|e| DispatchError::Build(e.to_string()))
}

/// Always base64, so the file reaches the inbox byte-for-byte.
///
/// A declared type that is not a valid MIME type is sent as
/// `application/octet-stream`.
fn attachment_part(attachment: &Attachment) -> Result<SinglePart, DispatchError> {
    let content_type = ContentType::parse(&attachment.mime_type)
        .or_else(|e| {
            warn!(
                "Attachment type '{}' is not a MIME type ({e}), sending as {DEFAULT_ATTACHMENT_TYPE}",
                attachment.mime_type
            );
            ContentType::parse(DEFAULT_ATTACHMENT_TYPE)
        })
        .map_err(|e| DispatchError::Build(format!("invalid attachment type: {e}")))?;
    let body = Body::new_with_encoding(
        attachment.content.to_vec(),
        ContentTransferEncoding::Base64,
    )
    .map_err(|_| DispatchError::Build("attachment could not be encoded".to_string()))?;

    Ok(MailAttachment::new(attachment.filename.clone()).body(body, content_type))
}
