//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. A `.env` file in the working
//! directory is loaded by `main` before this runs.

use std::net::SocketAddr;
use std::path::PathBuf;

use atelier_shared::constants::{
    DEFAULT_FEATURED_LIMIT, DEFAULT_HTTP_PORT, DEFAULT_RECIPIENT, DEFAULT_SMTP_PORT,
};

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (port 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// No TLS at all. Local relays and development only.
    None,
}

impl TlsMode {
    pub fn for_port(port: u16) -> Self {
        if port == 465 {
            Self::Implicit
        } else {
            Self::StartTls
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "implicit" | "tls" | "ssl" => Some(Self::Implicit),
            "starttls" => Some(Self::StartTls),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

/// Outbound mail account.
#[derive(Clone)]
pub struct SmtpConfig {
    /// Env: `SMTP_HOST`
    /// Default: `smtp.strato.de`
    pub host: String,

    /// Env: `SMTP_PORT`
    /// Default: `465`
    pub port: u16,

    /// Login name, also used as the sender address.
    /// Env: `SMTP_USER`
    /// Default: the contact recipient address
    pub user: String,

    /// Env: `SMTP_PASS`
    /// Default: empty
    pub password: String,

    /// Env: `SMTP_TLS` (implicit / starttls / none)
    /// Default: implicit on port 465, STARTTLS otherwise
    pub tls: TlsMode,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.strato.de".to_string(),
            port: DEFAULT_SMTP_PORT,
            user: DEFAULT_RECIPIENT.to_string(),
            password: String::new(),
            tls: TlsMode::for_port(DEFAULT_SMTP_PORT),
        }
    }
}

// Keeps the password out of `?config` log lines.
impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("tls", &self.tls)
            .finish()
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    pub smtp: SmtpConfig,

    /// Mailbox receiving every contact submission.
    /// Env: `CONTACT_RECIPIENT`
    pub contact_recipient: String,

    /// Directory scanned by `GET /api/gallery/scan`.
    /// Env: `GALLERY_DIR`
    /// Default: `./public/images/gallery`
    pub gallery_dir: PathBuf,

    /// URL prefix prepended to scanned file names.
    /// Env: `GALLERY_URL_PREFIX`
    /// Default: `/images/gallery`
    pub gallery_url_prefix: String,

    /// Directory served as static files for every unmatched route.
    /// Env: `STATIC_DIR`
    /// Default: `./public`
    pub static_dir: PathBuf,

    /// Number of curated images in `GET /api/gallery`.
    /// Env: `GALLERY_FEATURED_LIMIT`
    pub featured_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            smtp: SmtpConfig::default(),
            contact_recipient: DEFAULT_RECIPIENT.to_string(),
            gallery_dir: PathBuf::from("./public/images/gallery"),
            gallery_url_prefix: "/images/gallery".to_string(),
            static_dir: PathBuf::from("./public"),
            featured_limit: DEFAULT_FEATURED_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        // -- Mail account --

        if let Some(host) = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) {
            config.smtp.host = host.trim().to_string();
        }

        if let Some(port) = lookup("SMTP_PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => config.smtp.port = p,
                Err(_) => tracing::warn!(value = %port, "Invalid SMTP_PORT, using default"),
            }
        }
        config.smtp.tls = TlsMode::for_port(config.smtp.port);

        if let Some(val) = lookup("SMTP_TLS") {
            match TlsMode::parse(&val) {
                Some(mode) => config.smtp.tls = mode,
                None => tracing::warn!(value = %val, "Invalid SMTP_TLS, deriving from port"),
            }
        }

        if let Some(recipient) = lookup("CONTACT_RECIPIENT").filter(|r| !r.trim().is_empty()) {
            config.contact_recipient = recipient.trim().to_string();
            config.smtp.user = config.contact_recipient.clone();
        }

        if let Some(user) = lookup("SMTP_USER").filter(|u| !u.trim().is_empty()) {
            config.smtp.user = user.trim().to_string();
        }

        if let Some(pass) = lookup("SMTP_PASS") {
            config.smtp.password = pass;
        }

        // -- Gallery & static files --

        if let Some(dir) = lookup("GALLERY_DIR") {
            config.gallery_dir = PathBuf::from(dir);
        }

        if let Some(prefix) = lookup("GALLERY_URL_PREFIX") {
            config.gallery_url_prefix = prefix.trim_end_matches('/').to_string();
        }

        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        if let Some(val) = lookup("GALLERY_FEATURED_LIMIT") {
            match val.trim().parse::<usize>() {
                Ok(n) => config.featured_limit = n,
                Err(_) => tracing::warn!(value = %val, "Invalid GALLERY_FEATURED_LIMIT, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 3000).into());
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.tls, TlsMode::Implicit);
        assert_eq!(config.featured_limit, 12);
    }

    #[test]
    fn test_port_selects_starttls() {
        let config = from_pairs(&[("SMTP_HOST", "mail.example.org"), ("SMTP_PORT", "587")]);
        assert_eq!(config.smtp.host, "mail.example.org");
        assert_eq!(config.smtp.tls, TlsMode::StartTls);

        let config = from_pairs(&[("SMTP_PORT", "2525"), ("SMTP_TLS", "none")]);
        assert_eq!(config.smtp.tls, TlsMode::None);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = from_pairs(&[("HTTP_ADDR", "nope"), ("SMTP_PORT", "seventy")]);
        assert_eq!(config.http_addr, ServerConfig::default().http_addr);
        assert_eq!(config.smtp.port, 465);

        let config = from_pairs(&[("GALLERY_FEATURED_LIMIT", "lots")]);
        assert_eq!(config.featured_limit, 12);
        let config = from_pairs(&[("GALLERY_FEATURED_LIMIT", " 6 ")]);
        assert_eq!(config.featured_limit, 6);
    }

    #[test]
    fn test_sender_defaults_to_recipient() {
        let config = from_pairs(&[("CONTACT_RECIPIENT", "hello@studio.example")]);
        assert_eq!(config.smtp.user, "hello@studio.example");

        let config = from_pairs(&[
            ("CONTACT_RECIPIENT", "hello@studio.example"),
            ("SMTP_USER", "mailer@studio.example"),
        ]);
        assert_eq!(config.smtp.user, "mailer@studio.example");
        assert_eq!(config.contact_recipient, "hello@studio.example");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = from_pairs(&[("SMTP_PASS", "hunter2")]);
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("***"));
    }
}
