use thiserror::Error;

/// Errors produced by the presentation layer.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The contact handler could not be reached at all.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The handler answered with a non-2xx status.
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Reading or writing the persisted theme preference failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to determine a platform config directory.
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
