//! Presentation state for the Atelier site.
//!
//! Everything here is UI-framework agnostic: theme and navigation state
//! machines, the contact form lifecycle and its submission strategies, and
//! the data models behind the decorative animations. A front end renders
//! from these and feeds user input back in.

pub mod config;
pub mod contact;
pub mod decor;
pub mod error;
pub mod events;
pub mod navigation;
pub mod routes;
pub mod strategy;
pub mod theme;
pub mod view;

use tracing_subscriber::{fmt, EnvFilter};

pub use contact::{ContactForm, FormPhase, SubmitOutcome};
pub use error::{ClientError, Result};
pub use navigation::{NavigationIndicator, NavigationProgress};
pub use routes::Page;
pub use theme::ThemeContext;

/// Install the default `fmt` subscriber. A second call, or a host that
/// already installed its own subscriber, is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("atelier_client=debug,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
