//! # atelier-server
//!
//! HTTP backend for the studio website.
//!
//! This binary provides:
//! - **Contact endpoint** that turns form submissions into mail sent over
//!   SMTP (one fresh connection per submission, verified before sending)
//! - **Gallery listings**: a curated selection and a directory scan
//! - **Static file serving** for everything else under `STATIC_DIR`

mod api;
mod config;
mod error;
mod gallery;
mod gateway;
mod mail;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::gateway::MailGateway;
use crate::mail::SmtpMailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,atelier_server=debug")),
        )
        .init();

    info!("Starting atelier server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration (.env first, then the process environment)
    // -----------------------------------------------------------------------
    if let Ok(path) = dotenvy::dotenv() {
        info!(path = %path.display(), "Loaded .env file");
    }

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    if config.smtp.password.is_empty() {
        tracing::warn!("SMTP_PASS is empty; contact submissions will likely fail to send");
    }

    // -----------------------------------------------------------------------
    // 3. Wire the mail gateway
    // -----------------------------------------------------------------------
    let transport = Arc::new(SmtpMailer::new(config.smtp.clone()));
    let gateway = MailGateway::new(transport, config.contact_recipient.clone());

    let http_addr = config.http_addr;
    let app_state = AppState {
        gateway,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
