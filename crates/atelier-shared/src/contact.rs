//! Contact submissions and the mail composed from them.
//!
//! A [`ContactSubmission`] is what the contact form posts. It is validated
//! with [`ContactSubmission::validate`] and turned into an
//! [`OutboundMessage`] (subject line, plain-text and HTML bodies) by
//! [`OutboundMessage::compose`]. Delivery outcome is reported as a
//! [`SubmissionResult`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{MSG_SEND_FAILED, MSG_SENT, MSG_SMTP_VERIFY_FAILED};
use crate::error::ContactError;
use crate::types::Variant;

/// Treat an explicit `null` like an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub selected_subjects: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub variant: Variant,
}

impl ContactSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    /// Name, email and message must be non-blank. The email address is
    /// deliberately not checked for RFC compliance.
    pub fn validate(&self) -> Result<(), ContactError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContactError::MissingFields(missing))
        }
    }

    /// `"{prefix} Anfrage{ - tag, tag} - {name}"`
    pub fn subject_line(&self) -> String {
        let prefix = self.variant.subject_prefix();
        match self.tag_list() {
            Some(tags) => format!("{prefix} Anfrage - {tags} - {}", self.name),
            None => format!("{prefix} Anfrage - {}", self.name),
        }
    }

    /// Non-blank subject tags joined by `", "`, or `None` when there are none.
    pub fn tag_list(&self) -> Option<String> {
        let tags: Vec<&str> = self
            .selected_subjects
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if tags.is_empty() {
            None
        } else {
            Some(tags.join(", "))
        }
    }

    /// Plain-text rendering shared by the outbound mail and the mail-client
    /// deep link.
    pub fn plain_text_body(&self) -> String {
        let mut body = String::from("Neue Anfrage über das Kontaktformular\n\n");
        body.push_str(&format!("Name: {}\n", self.name));
        body.push_str(&format!("E-Mail: {}\n", self.email));
        if let Some(tags) = self.tag_list() {
            body.push_str(&format!("Themen: {tags}\n"));
        }
        body.push_str("\nNachricht:\n");
        body.push_str(&self.message);
        body
    }

    pub fn html_body(&self) -> String {
        let mut html = format!(
            "<h2>Neue {} Anfrage</h2>\n",
            escape_html(self.variant.subject_prefix())
        );
        html.push_str(&format!(
            "<p><strong>Name:</strong> {}</p>\n",
            escape_html(&self.name)
        ));
        html.push_str(&format!(
            "<p><strong>E-Mail:</strong> {}</p>\n",
            escape_html(&self.email)
        ));
        if let Some(tags) = self.tag_list() {
            html.push_str(&format!(
                "<p><strong>Themen:</strong> {}</p>\n",
                escape_html(&tags)
            ));
        }
        html.push_str("<p><strong>Nachricht:</strong></p>\n");
        html.push_str(&format!("<p>{}</p>", line_breaks(&escape_html(&self.message))));
        html
    }
}

/// Escape the five markup-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn line_breaks(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\n', "<br>")
}

/// A fully composed mail, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub recipient: String,
    /// Display name of the sender: the submitter's name.
    pub sender_name: String,
    /// Submitter address, used as Reply-To when it parses.
    pub reply_to: String,
}

impl OutboundMessage {
    pub fn compose(submission: &ContactSubmission, recipient: &str) -> Self {
        Self {
            subject: submission.subject_line(),
            text_body: submission.plain_text_body(),
            html_body: submission.html_body(),
            recipient: recipient.to_string(),
            sender_name: submission.name.trim().to_string(),
            reply_to: submission.email.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Success,
    ValidationError,
    TransportError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub outcome: Outcome,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl SubmissionResult {
    pub fn success() -> Self {
        Self {
            outcome: Outcome::Success,
            message: MSG_SENT.to_string(),
            details: None,
        }
    }

    pub fn validation(err: &ContactError) -> Self {
        Self {
            outcome: Outcome::ValidationError,
            message: err.to_string(),
            details: None,
        }
    }

    pub fn verify_failed(details: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::TransportError,
            message: MSG_SMTP_VERIFY_FAILED.to_string(),
            details: Some(details.into()),
        }
    }

    pub fn send_failed(details: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::TransportError,
            message: MSG_SEND_FAILED.to_string(),
            details: Some(details.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
