//! # atelier-shared
//!
//! Types shared by the studio site's HTTP API and its presentation client:
//! contact submissions and the mail composed from them, theme and variant
//! enums, JSON payloads, and the fixed user-facing messages.

pub mod constants;
pub mod contact;
pub mod error;
pub mod protocol;
pub mod types;

pub use contact::{ContactSubmission, OutboundMessage, Outcome, SubmissionResult};
pub use error::ContactError;
pub use types::{ThemeMode, Variant};
