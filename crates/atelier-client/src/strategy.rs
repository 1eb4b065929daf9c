//! How a contact form gets its submission out of the browser.
//!
//! Two strategies, picked by configuration and never used as fallbacks
//! for each other:
//! - [`ApiSubmission`] posts the submission to the contact handler.
//! - [`MailtoSubmission`] builds a `mailto:` deep link with subject and
//!   body filled in; the visitor's mail client does the sending.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use atelier_shared::protocol::{ContactResponse, ErrorResponse};
use atelier_shared::ContactSubmission;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The handler accepted the submission and sent the mail.
    Sent { message: String },
    /// A mail-client deep link to open.
    Handoff { link: String },
}

#[async_trait]
pub trait SubmissionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn submit(&self, submission: &ContactSubmission) -> Result<Delivery>;
}

/// `POST {api_base}/api/contact`
#[derive(Debug, Clone)]
pub struct ApiSubmission {
    client: reqwest::Client,
    endpoint: String,
}

impl ApiSubmission {
    pub fn new(api_base: &str) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    pub fn with_client(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/contact", api_base.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionStrategy for ApiSubmission {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn submit(&self, submission: &ContactSubmission) -> Result<Delivery> {
        debug!(endpoint = %self.endpoint, "Posting contact submission");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let body: ContactResponse = resp.json().await?;
            info!("Contact submission accepted");
            return Ok(Delivery::Sent {
                message: body.message,
            });
        }

        let text = resp.text().await.unwrap_or_default();
        let (message, details) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) => (err.error, err.details),
            Err(_) => (status_text(status), None),
        };
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
            details,
        })
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

/// `mailto:{recipient}?subject=…&body=…`
#[derive(Debug, Clone)]
pub struct MailtoSubmission {
    recipient: String,
}

impl MailtoSubmission {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }

    pub fn link_for(&self, submission: &ContactSubmission) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.recipient,
            urlencoding::encode(&submission.subject_line()),
            urlencoding::encode(&submission.plain_text_body()),
        )
    }
}

#[async_trait]
impl SubmissionStrategy for MailtoSubmission {
    fn name(&self) -> &'static str {
        "mailto"
    }

    async fn submit(&self, submission: &ContactSubmission) -> Result<Delivery> {
        let link = self.link_for(submission);
        debug!(len = link.len(), "Built mail-client link");
        Ok(Delivery::Handoff { link })
    }
}
