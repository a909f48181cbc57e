//! Axum route handlers for the relay endpoints.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::mail::MessageId;
use crate::relay::form::read_form;
use crate::relay::validation::{ValidationError, MAX_ATTACHMENT_BYTES};
use crate::relay::{relay_submission, RelayKind};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub ok: bool,
    pub id: MessageId,
}

/// POST /relay/callback
///
/// Contact form: "hire talent" inquiries and callback requests.
pub async fn handle_callback(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    handle(&state, RelayKind::Callback, multipart).await
}

/// POST /relay/talent
///
/// Talent network sign-up with a CV upload.
pub async fn handle_talent(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    handle(&state, RelayKind::Talent, multipart).await
}

async fn handle(
    state: &AppState,
    kind: RelayKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RelayResponse>, AppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    // One byte past the limit is enough to tell "too large" apart.
    let form = read_form(multipart, MAX_ATTACHMENT_BYTES + 1)
        .await
        .map_err(|e| form_error(state, kind, e))?;

    let id = relay_submission(state, kind, &form).await?;
    Ok(Json(RelayResponse { ok: true, id }))
}

/// A talent body cut short by the request body limit can only be an oversized CV.
fn form_error(state: &AppState, kind: RelayKind, err: MultipartError) -> AppError {
    if kind == RelayKind::Talent && err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ValidationError::AttachmentTooLarge {
            size: state.config.max_body_bytes,
        }
        .into();
    }
    AppError::BadRequest(err.body_text())
}
