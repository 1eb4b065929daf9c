//! Client configuration.

use std::sync::Arc;

use atelier_shared::constants::{DEFAULT_HTTP_PORT, DEFAULT_RECIPIENT};

use crate::strategy::{ApiSubmission, MailtoSubmission, SubmissionStrategy};

/// Which submission strategy a contact form uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Api,
    Mailto,
}

impl StrategyKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "api" => Some(Self::Api),
            "mailto" => Some(Self::Mailto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Env: `ATELIER_API_BASE`
    /// Default: `http://localhost:3000`
    pub api_base: String,

    /// Recipient of `mailto:` links.
    /// Env: `ATELIER_CONTACT_RECIPIENT`
    pub contact_recipient: String,

    /// Env: `ATELIER_CONTACT_STRATEGY` (api / mailto)
    /// Default: `api`
    pub strategy: StrategyKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: format!("http://localhost:{DEFAULT_HTTP_PORT}"),
            contact_recipient: DEFAULT_RECIPIENT.to_string(),
            strategy: StrategyKind::Api,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup("ATELIER_API_BASE").filter(|b| !b.trim().is_empty()) {
            config.api_base = base.trim().to_string();
        }

        if let Some(recipient) = lookup("ATELIER_CONTACT_RECIPIENT").filter(|r| !r.trim().is_empty()) {
            config.contact_recipient = recipient.trim().to_string();
        }

        if let Some(val) = lookup("ATELIER_CONTACT_STRATEGY") {
            match StrategyKind::parse(&val) {
                Some(kind) => config.strategy = kind,
                None => tracing::warn!(value = %val, "Invalid ATELIER_CONTACT_STRATEGY, using api"),
            }
        }

        config
    }

    pub fn build_strategy(&self) -> Arc<dyn SubmissionStrategy> {
        match self.strategy {
            StrategyKind::Api => Arc::new(ApiSubmission::new(&self.api_base)),
            StrategyKind::Mailto => Arc::new(MailtoSubmission::new(self.contact_recipient.clone())),
        }
    }
}
