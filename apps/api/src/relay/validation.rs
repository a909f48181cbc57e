use thiserror::Error;

use crate::config::RelayPolicy;
use crate::models::submission::{
    Attachment, CallbackSubmission, InquiryKind, Submission, TalentSubmission,
};
use crate::relay::form::{RawForm, RawFile};
use crate::relay::RelayKind;

/// 5 MiB.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_CV_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Client-caused rejection. The display text is sent back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{label} is required")]
    MissingField { label: &'static str },

    #[error("CV file is required")]
    MissingAttachment,

    #[error("File too large (max 5MB)")]
    AttachmentTooLarge { size: usize },

    #[error("Only PDF/DOC/DOCX are allowed")]
    UnsupportedAttachmentType { mime_type: String },
}

/// Turns raw form values into a [`Submission`] for the given relay.
pub fn validate(
    kind: RelayKind,
    form: &RawForm,
    policy: &RelayPolicy,
) -> Result<Submission, ValidationError> {
    match kind {
        RelayKind::Callback => validate_callback(form).map(Submission::Callback),
        RelayKind::Talent => validate_talent(form, policy).map(Submission::Talent),
    }
}

pub fn validate_callback(form: &RawForm) -> Result<CallbackSubmission, ValidationError> {
    let email = require_email(form)?;
    Ok(CallbackSubmission {
        kind: InquiryKind::parse(&form.text("kind")),
        name: form.text("name"),
        company: form.text("company"),
        email,
        phone: form.text("phone"),
        message: form.text("message"),
    })
}

pub fn validate_talent(
    form: &RawForm,
    policy: &RelayPolicy,
) -> Result<TalentSubmission, ValidationError> {
    let email = require_email(form)?;
    let file = form.file("cv").ok_or(ValidationError::MissingAttachment)?;
    check_attachment(file, policy)?;

    Ok(TalentSubmission {
        first_name: form.text("firstName"),
        last_name: form.text("lastName"),
        email,
        location: form.text("location"),
        role: form.text("role"),
        experience: form.text("experience"),
        skills: form.text("skills"),
        employment_type: form.text("employmentType"),
        work_mode: form.text("workMode"),
        seniority: form.text("seniority"),
        cv: Attachment::new(
            file.filename.as_deref(),
            file.content_type.as_deref(),
            file.content.clone(),
        ),
    })
}

fn require_email(form: &RawForm) -> Result<String, ValidationError> {
    let email = form.text("email");
    if email.trim().is_empty() {
        return Err(ValidationError::MissingField { label: "Email" });
    }
    Ok(email.trim().to_string())
}

/// Size is checked before type so an oversized file is always reported as such.
fn check_attachment(file: &RawFile, policy: &RelayPolicy) -> Result<(), ValidationError> {
    if file.size > MAX_ATTACHMENT_BYTES {
        return Err(ValidationError::AttachmentTooLarge { size: file.size });
    }

    let declared = file.content_type.as_deref().map(mime_essence).unwrap_or_default();
    if policy.strict_attachment_types
        && !declared.is_empty()
        && !ALLOWED_CV_TYPES.contains(&declared.as_str())
    {
        return Err(ValidationError::UnsupportedAttachmentType {
            mime_type: declared,
        });
    }

    Ok(())
}

/// `Application/PDF; name=x` → `application/pdf`
fn mime_essence(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
