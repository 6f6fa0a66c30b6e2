//! Error types for image tool operations.
//!
//! The visual core itself never fails; these errors only surface at the
//! boundaries where host-provided JSON is parsed.

use thiserror::Error;

/// Result type for image tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur while decoding host input.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Config or attachment data serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A replay script step could not be applied.
    #[error("Invalid script step {index}: {reason}")]
    InvalidScript {
        /// Zero-based index of the offending step.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
}
