//! MindGate error types

use thiserror::Error;

/// MindGate error type
#[derive(Error, Debug)]
pub enum Error {
    /// Provider policy error
    #[error("Policy error: {0}")]
    Policy(String),

    /// Rule definition or evaluation error
    #[error("Rule error: {0}")]
    Rule(String),

    /// Content filter error
    #[error("Filter error: {0}")]
    Filter(String),

    /// Audit ledger error
    #[error("Audit error: {0}")]
    Audit(String),

    /// Audit storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for MindGate operations
pub type Result<T> = std::result::Result<T, Error>;
