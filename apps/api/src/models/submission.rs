use bytes::Bytes;

pub const DEFAULT_ATTACHMENT_NAME: &str = "cv";
pub const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// Which button the visitor pressed on the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InquiryKind {
    Hire,
    Callback,
}

impl InquiryKind {
    /// Anything other than `hire` is a callback request.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("hire") {
            InquiryKind::Hire
        } else {
            InquiryKind::Callback
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryKind::Hire => "hire",
            InquiryKind::Callback => "callback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSubmission {
    pub kind: InquiryKind,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub role: String,
    pub experience: String,
    pub skills: String,
    pub employment_type: String,
    pub work_mode: String,
    pub seniority: String,
    pub cv: Attachment,
}

/// One validated form post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Callback(CallbackSubmission),
    Talent(TalentSubmission),
}

impl Submission {
    /// The submitter's own address, used as `Reply-To`.
    pub fn email(&self) -> &str {
        match self {
            Submission::Callback(s) => &s.email,
            Submission::Talent(s) => &s.email,
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            Submission::Callback(_) => None,
            Submission::Talent(s) => Some(&s.cv),
        }
    }
}

/// A file carried through to the outgoing mail byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub content: Bytes,
}

impl Attachment {
    /// Applies the `cv` / `application/octet-stream` defaults for blank metadata.
    pub fn new(filename: Option<&str>, mime_type: Option<&str>, content: Bytes) -> Self {
        fn non_blank(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        Self {
            filename: non_blank(filename)
                .unwrap_or(DEFAULT_ATTACHMENT_NAME)
                .to_string(),
            mime_type: non_blank(mime_type)
                .unwrap_or(DEFAULT_ATTACHMENT_TYPE)
                .to_string(),
            content,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}
