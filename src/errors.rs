// errors.rs
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. Any of these aborts the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("failed to read recipients file {}: {source}", .path.display())]
    RecipientsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid recipients JSON: {0}")]
    RecipientsJson(#[from] serde_json::Error),
}
