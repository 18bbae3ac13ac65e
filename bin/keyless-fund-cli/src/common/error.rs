use alloy_primitives::hex::FromHexError;
use keyless_fund::FundingError;

/// Error types for the keyless-fund commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Funding tree construction or verification failed
    #[error("Funding tree error: {0}")]
    Funding(#[from] FundingError),

    /// Failed to read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid JSON document
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the keyless-fund commands
pub type Result<T> = std::result::Result<T, CliError>;
