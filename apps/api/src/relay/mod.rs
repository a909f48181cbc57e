// Form relay: validate → compose → dispatch, one pass per request.
// Nothing here retries or keeps state between requests.

pub mod compose;
pub mod form;
pub mod handlers;
pub mod validation;

use tracing::info;

use crate::errors::AppError;
use crate::mail::{MessageId, OutgoingMail};
use crate::relay::compose::compose;
use crate::relay::form::RawForm;
use crate::relay::validation::validate;
use crate::state::AppState;

/// The two public forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Callback,
    Talent,
}

impl RelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayKind::Callback => "callback",
            RelayKind::Talent => "talent",
        }
    }
}

/// Runs one submission through the pipeline and returns the transport's id.
///
/// Validation failures return before the dispatcher is touched.
pub async fn relay_submission(
    state: &AppState,
    kind: RelayKind,
    form: &RawForm,
) -> Result<MessageId, AppError> {
    let policy = state.policy(kind);
    let submission = validate(kind, form, policy)?;
    let notification = compose(&submission);

    let mail = OutgoingMail {
        from: state.config.mail.from_header(),
        to: state.config.mail.to_email.clone(),
        reply_to: submission.email().to_string(),
        subject: notification.subject,
        text: notification.text,
        html: policy.rich_text.then_some(notification.html),
        attachment: submission.attachment().cloned(),
    };

    let attached = mail.attachment.as_ref().map_or(0, |a| a.size_bytes());
    let id = state.dispatcher.send(&mail).await?;
    info!(
        "Relayed {} submission via {} (id {id}, attachment {attached} bytes)",
        kind.as_str(),
        state.dispatcher.transport_name()
    );
    Ok(id)
}
