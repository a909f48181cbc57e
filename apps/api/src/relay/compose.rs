//! Notification Composer — renders a validated submission into mail content.
//!
//! Output is a pure function of the input: the same submission always yields
//! byte-identical subject and bodies. No validation happens here.

use std::fmt::Write;

use crate::models::submission::{CallbackSubmission, InquiryKind, Submission, TalentSubmission};

const TALENT_FALLBACK_ROLE: &str = "Talent Network";

/// Subject plus both renditions of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn compose(submission: &Submission) -> Notification {
    match submission {
        Submission::Callback(s) => compose_callback(s),
        Submission::Talent(s) => compose_talent(s),
    }
}

fn compose_callback(s: &CallbackSubmission) -> Notification {
    let subject = match s.kind {
        InquiryKind::Hire => {
            let who = if s.company.trim().is_empty() {
                &s.name
            } else {
                &s.company
            };
            format!("Hire Talent inquiry from {who}")
        }
        InquiryKind::Callback => format!("Callback request from {}", s.name),
    };

    let kind = s.kind.as_str();
    let text = format!(
        "New website inquiry ({kind})\n\n\
         Name: {}\n\
         Company: {}\n\
         Email: {}\n\
         Phone: {}\n\n\
         Message:\n{}",
        s.name, s.company, s.email, s.phone, s.message
    )
    .trim()
    .to_string();

    let mut html = String::new();
    let _ = writeln!(html, "<h3>New website inquiry ({kind})</h3>");
    push_row(&mut html, "Name", &escape_html(&s.name));
    push_row(&mut html, "Company", &escape_html(&s.company));
    push_row(&mut html, "Email", &escape_html(&s.email));
    push_row(&mut html, "Phone", &escape_html(&s.phone));
    let _ = writeln!(
        html,
        "<p><b>Message:</b><br/>{}</p>",
        multiline_html(&s.message)
    );

    Notification {
        subject,
        text,
        html,
    }
}

fn compose_talent(s: &TalentSubmission) -> Notification {
    let role_label = if s.role.trim().is_empty() {
        TALENT_FALLBACK_ROLE
    } else {
        s.role.as_str()
    };
    let subject = format!(
        "New CV submission: {} {} ({role_label})",
        s.first_name, s.last_name
    );

    let full_name = format!("{} {}", s.first_name, s.last_name);
    let text = format!(
        "New Talent Network submission\n\n\
         Name: {full_name}\n\
         Email: {}\n\
         Location: {}\n\
         Primary Role: {}\n\
         Experience: {}\n\
         Skills: {}\n\
         Employment Type: {}\n\
         Work Mode: {}\n\
         Seniority: {}",
        s.email,
        s.location,
        s.role,
        s.experience,
        s.skills,
        s.employment_type,
        s.work_mode,
        s.seniority
    )
    .trim()
    .to_string();

    let mut html = String::new();
    let _ = writeln!(html, "<h3>New Talent Network Submission</h3>");
    push_row(&mut html, "Name", &escape_html(&full_name));
    push_row(&mut html, "Email", &escape_html(&s.email));
    push_row(&mut html, "Location", &escape_html(&s.location));
    push_row(&mut html, "Primary Role", &escape_html(&s.role));
    push_row(&mut html, "Experience", &escape_html(&s.experience));
    push_row(&mut html, "Skills", &multiline_html(&s.skills));
    push_row(&mut html, "Employment Type", &escape_html(&s.employment_type));
    push_row(&mut html, "Work Mode", &escape_html(&s.work_mode));
    push_row(&mut html, "Seniority", &escape_html(&s.seniority));

    Notification {
        subject,
        text,
        html,
    }
}

/// `value` must already be escaped.
fn push_row(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(html, "<p><b>{label}:</b> {value}</p>");
}

fn multiline_html(raw: &str) -> String {
    escape_html(raw)
        .replace("\r\n", "\n")
        .replace('\n', "<br/>")
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::models::submission::Attachment;

    fn callback(kind: InquiryKind, name: &str, company: &str) -> Submission {
        Submission::Callback(CallbackSubmission {
            kind,
            name: name.into(),
            company: company.into(),
            email: "a@b.com".into(),
            phone: String::new(),
            message: "Line one\nLine two".into(),
        })
    }

    fn talent(role: &str) -> Submission {
        Submission::Talent(TalentSubmission {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            location: "London".into(),
            role: role.into(),
            experience: "10+ years".into(),
            skills: "Rust\nPostgres".into(),
            employment_type: "Contract".into(),
            work_mode: "Remote".into(),
            seniority: "Senior".into(),
            cv: Attachment::new(Some("cv.pdf"), Some("application/pdf"), Bytes::new()),
        })
    }

    #[test]
    fn test_callback_subject_and_name_line() {
        let n = compose(&callback(InquiryKind::Callback, "Jane", ""));
        assert_eq!(n.subject, "Callback request from Jane");
        assert!(n.text.lines().any(|l| l == "Name: Jane"));
        assert!(n.text.starts_with("New website inquiry (callback)"));
    }

    #[test]
    fn test_callback_subject_ignores_company() {
        let n = compose(&callback(InquiryKind::Callback, "Jane", "Acme"));
        assert_eq!(n.subject, "Callback request from Jane");
    }

    #[test]
    fn test_hire_subject_prefers_company() {
        let n = compose(&callback(InquiryKind::Hire, "", "Acme"));
        assert_eq!(n.subject, "Hire Talent inquiry from Acme");
        let n = compose(&callback(InquiryKind::Hire, "Jane", ""));
        assert_eq!(n.subject, "Hire Talent inquiry from Jane");
    }

    #[test]
    fn test_blank_fields_are_rendered_not_omitted() {
        let n = compose(&callback(InquiryKind::Callback, "Jane", ""));
        assert!(n.text.lines().any(|l| l == "Company: "));
        assert!(n.text.lines().any(|l| l == "Phone: "));
        assert!(n.html.contains("<p><b>Phone:</b> </p>"));
    }

    #[test]
    fn test_message_newlines_become_breaks() {
        let n = compose(&callback(InquiryKind::Callback, "Jane", ""));
        assert!(n.text.ends_with("Message:\nLine one\nLine two"));
        assert!(n
            .html
            .contains("<p><b>Message:</b><br/>Line one<br/>Line two</p>"));
    }

    #[test]
    fn test_html_values_are_escaped() {
        let n = compose(&callback(InquiryKind::Callback, "<script>", "A & B"));
        assert!(n.html.contains("&lt;script&gt;"));
        assert!(n.html.contains("A &amp; B"));
        assert!(!n.html.contains("<script>"));
    }

    #[test]
    fn test_talent_subject_with_role() {
        let n = compose(&talent("Backend Engineer"));
        assert_eq!(n.subject, "New CV submission: Ada Lovelace (Backend Engineer)");
    }

    #[test]
    fn test_talent_subject_falls_back_without_role() {
        let n = compose(&talent(""));
        assert_eq!(n.subject, "New CV submission: Ada Lovelace (Talent Network)");
    }

    #[test]
    fn test_talent_text_field_order() {
        let n = compose(&talent("Backend Engineer"));
        let labels: Vec<&str> = n
            .text
            .lines()
            .filter_map(|l| l.split_once(':').map(|(label, _)| label))
            .collect();
        assert_eq!(
            labels,
            vec![
                "Name",
                "Email",
                "Location",
                "Primary Role",
                "Experience",
                "Skills",
                "Employment Type",
                "Work Mode",
                "Seniority",
            ]
        );
        assert!(n.html.contains("<p><b>Skills:</b> Rust<br/>Postgres</p>"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        for submission in [callback(InquiryKind::Hire, "Jane", "Acme"), talent("")] {
            assert_eq!(compose(&submission), compose(&submission));
        }
    }
}
