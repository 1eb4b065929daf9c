//! Outbound mail transport.
//!
//! [`MailTransport`] hands out one fresh [`MailConnection`] per dispatch;
//! nothing is pooled or shared between submissions. [`SmtpMailer`] is the
//! production implementation on top of lettre's async SMTP client.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

use atelier_shared::OutboundMessage;

use crate::config::{SmtpConfig, TlsMode};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid transport configuration: {0}")]
    Config(String),

    #[error("Transport verification failed: {0}")]
    Verify(String),

    #[error("Could not build message: {0}")]
    Build(String),

    #[error("{0}")]
    Send(String),
}

/// Opens connections to a mail service.
pub trait MailTransport: Send + Sync {
    fn connect(&self) -> Result<Box<dyn MailConnection>, MailError>;
}

/// A single connection, used for exactly one verify + send.
#[async_trait]
pub trait MailConnection: Send + Sync {
    async fn verify(&self) -> Result<(), MailError>;
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// SMTP transport configured from [`SmtpConfig`].
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn sender_address(&self) -> Result<Address, MailError> {
        self.config
            .user
            .parse::<Address>()
            .map_err(|e| MailError::Config(format!("sender '{}': {e}", self.config.user)))
    }
}

impl MailTransport for SmtpMailer {
    fn connect(&self) -> Result<Box<dyn MailConnection>, MailError> {
        let sender = self.sender_address()?;
        let host = self.config.host.as_str();
        let builder = match self.config.tls {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| MailError::Config(e.to_string()))?,
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| MailError::Config(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let mut builder = builder.port(self.config.port);
        if !self.config.password.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ));
        }

        debug!(
            host = %self.config.host,
            port = self.config.port,
            tls = ?self.config.tls,
            "Opening SMTP connection"
        );

        Ok(Box::new(SmtpConnection {
            transport: builder.build(),
            sender,
        }))
    }
}

struct SmtpConnection {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Address,
}

impl SmtpConnection {
    fn build_message(&self, message: &OutboundMessage) -> Result<Message, MailError> {
        let recipient = message
            .recipient
            .parse::<Address>()
            .map_err(|e| MailError::Build(format!("recipient '{}': {e}", message.recipient)))?;

        let mut builder = Message::builder()
            .from(Mailbox::new(Some(message.sender_name.clone()), self.sender.clone()))
            .to(Mailbox::new(None, recipient))
            .subject(message.subject.clone());

        // The submitted address is not validated; only use it when it parses.
        if let Ok(reply_to) = message.reply_to.parse::<Address>() {
            builder = builder.reply_to(Mailbox::new(Some(message.sender_name.clone()), reply_to));
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailConnection for SmtpConnection {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Verify("server did not accept NOOP".into())),
            Err(e) => Err(MailError::Verify(e.to_string())),
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = self.build_message(message)?;
        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

/// In-memory transport that records every call.
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    pub struct FakeTransport {
        pub connect_error: Option<String>,
        pub fail_verify: bool,
        pub send_error: Option<String>,
        pub connects: Arc<AtomicUsize>,
        pub verifies: Arc<AtomicUsize>,
        pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
    }

    impl FakeTransport {
        pub fn failing_connect(reason: &str) -> Self {
            Self {
                connect_error: Some(reason.to_string()),
                ..Default::default()
            }
        }

        pub fn failing_verify() -> Self {
            Self {
                fail_verify: true,
                ..Default::default()
            }
        }

        pub fn failing_send(reason: &str) -> Self {
            Self {
                send_error: Some(reason.to_string()),
                ..Default::default()
            }
        }

        pub fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }

        pub fn verify_count(&self) -> usize {
            self.verifies.load(Ordering::SeqCst)
        }

        pub fn sent(&self) -> Vec<OutboundMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MailTransport for FakeTransport {
        fn connect(&self) -> Result<Box<dyn MailConnection>, MailError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if let Some(reason) = &self.connect_error {
                return Err(MailError::Config(reason.clone()));
            }
            Ok(Box::new(self.clone()))
        }
    }

    #[async_trait]
    impl MailConnection for FakeTransport {
        async fn verify(&self) -> Result<(), MailError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            if self.fail_verify {
                return Err(MailError::Verify("connection refused".into()));
            }
            Ok(())
        }

        async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
            if let Some(reason) = &self.send_error {
                return Err(MailError::Send(reason.clone()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_shared::{ContactSubmission, Variant};

    fn mailer_for(user: &str) -> SmtpMailer {
        SmtpMailer::new(SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            user: user.into(),
            password: String::new(),
            tls: TlsMode::None,
        })
    }

    fn mailer() -> SmtpMailer {
        mailer_for("studio@example.org")
    }

    fn outbound(reply_to: &str) -> OutboundMessage {
        let submission = ContactSubmission::new("Anna", reply_to, "Hallo")
            .with_variant(Variant::Photography)
            .with_subjects(["Porträt"]);
        OutboundMessage::compose(&submission, "kontakt@example.org")
    }

    fn connection() -> SmtpConnection {
        SmtpConnection {
            transport: AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost")
                .port(2525)
                .build(),
            sender: mailer().sender_address().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_build_message_headers() {
        let message = connection().build_message(&outbound("a@b.de")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("studio@example.org"));
        assert!(raw.contains("Reply-To:"));
        assert!(raw.contains("kontakt@example.org"));
    }

    #[tokio::test]
    async fn test_unparsable_reply_to_is_skipped() {
        let message = connection()
            .build_message(&outbound("not an address"))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(!raw.contains("Reply-To:"));
    }

    #[tokio::test]
    async fn test_invalid_sender_fails_on_connect() {
        let result = mailer_for("not a mailbox").connect();
        assert!(matches!(result, Err(MailError::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_build_error() {
        let mut message = outbound("a@b.de");
        message.recipient = "nobody".into();
        assert!(matches!(
            connection().build_message(&message),
            Err(MailError::Build(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_without_tls_builds() {
        assert!(mailer().connect().is_ok());
    }
}
