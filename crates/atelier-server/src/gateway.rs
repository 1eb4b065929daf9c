//! Mail dispatch for contact submissions.
//!
//! Validates a [`ContactSubmission`], composes the outbound mail, verifies
//! the transport and sends. Every failure is folded into a
//! [`SubmissionResult`]; nothing is retried.

use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use atelier_shared::{ContactSubmission, OutboundMessage, SubmissionResult};

use crate::mail::MailTransport;

#[derive(Clone)]
pub struct MailGateway {
    transport: Arc<dyn MailTransport>,
    recipient: String,
}

impl MailGateway {
    pub fn new(transport: Arc<dyn MailTransport>, recipient: impl Into<String>) -> Self {
        Self {
            transport,
            recipient: recipient.into(),
        }
    }

    pub async fn dispatch(&self, submission: &ContactSubmission) -> SubmissionResult {
        let submission_id = Uuid::new_v4();
        let span = info_span!(
            "contact_dispatch",
            submission_id = %submission_id,
            variant = %submission.variant,
        );
        self.dispatch_inner(submission).instrument(span).await
    }

    async fn dispatch_inner(&self, submission: &ContactSubmission) -> SubmissionResult {
        if let Err(e) = submission.validate() {
            warn!(error = ?e, "Rejected contact submission");
            return SubmissionResult::validation(&e);
        }

        let message = OutboundMessage::compose(submission, &self.recipient);

        let connection = match self.transport.connect() {
            Ok(connection) => connection,
            Err(e) => {
                error!(error = %e, "Could not open mail transport");
                return SubmissionResult::verify_failed(e.to_string());
            }
        };

        if let Err(e) = connection.verify().await {
            error!(error = %e, "Mail transport verification failed");
            return SubmissionResult::verify_failed(e.to_string());
        }

        match connection.send(&message).await {
            Ok(()) => {
                info!(subject = %message.subject, "Contact mail sent");
                SubmissionResult::success()
            }
            Err(e) => {
                error!(error = %e, "Sending contact mail failed");
                SubmissionResult::send_failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::fake::FakeTransport;
    use atelier_shared::constants::{MSG_MISSING_FIELDS, MSG_SEND_FAILED, MSG_SMTP_VERIFY_FAILED};
    use atelier_shared::{Outcome, Variant};

    fn gateway(transport: &FakeTransport) -> MailGateway {
        MailGateway::new(Arc::new(transport.clone()), "kontakt@example.org")
    }

    fn anna() -> ContactSubmission {
        ContactSubmission::new("Anna", "a@b.de", "Hallo")
            .with_variant(Variant::Photography)
            .with_subjects(["Porträt"])
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let transport = FakeTransport::default();
        let result = gateway(&transport).dispatch(&anna()).await;

        assert_eq!(result.outcome, Outcome::Success);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Fotografie Anfrage - Porträt - Anna");
        assert_eq!(sent[0].recipient, "kontakt@example.org");
    }

    #[tokio::test]
    async fn test_missing_field_never_touches_transport() {
        let transport = FakeTransport::default();
        let submission = ContactSubmission::new("", "a@b.de", "Hallo");
        let result = gateway(&transport).dispatch(&submission).await;

        assert_eq!(result.outcome, Outcome::ValidationError);
        assert_eq!(result.message, MSG_MISSING_FIELDS);
        assert_eq!(transport.connect_count(), 0);
        assert_eq!(transport.verify_count(), 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_verify_failure_skips_send() {
        let transport = FakeTransport::failing_verify();
        let result = gateway(&transport).dispatch(&anna()).await;

        assert_eq!(result.outcome, Outcome::TransportError);
        assert_eq!(result.message, MSG_SMTP_VERIFY_FAILED);
        assert!(result.details.is_some());
        assert_eq!(transport.verify_count(), 1);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_bad_transport_config_reported_as_verify_failure() {
        let transport = FakeTransport::failing_connect("sender 'not a mailbox': invalid");
        let result = gateway(&transport).dispatch(&anna()).await;

        assert_eq!(result.outcome, Outcome::TransportError);
        assert_eq!(result.message, MSG_SMTP_VERIFY_FAILED);
        assert!(result.details.unwrap().contains("not a mailbox"));
        assert_eq!(transport.verify_count(), 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_carries_details() {
        let transport = FakeTransport::failing_send("550 mailbox unavailable");
        let result = gateway(&transport).dispatch(&anna()).await;

        assert_eq!(result.outcome, Outcome::TransportError);
        assert_eq!(result.message, MSG_SEND_FAILED);
        assert_eq!(result.details.as_deref(), Some("550 mailbox unavailable"));
    }

    #[tokio::test]
    async fn test_fresh_connection_per_dispatch() {
        let transport = FakeTransport::default();
        let gw = gateway(&transport);
        gw.dispatch(&anna()).await;
        gw.dispatch(&anna()).await;
        assert_eq!(transport.connect_count(), 2);
        assert_eq!(transport.sent().len(), 2);
    }
}
