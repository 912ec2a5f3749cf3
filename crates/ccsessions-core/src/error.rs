//! Error types for ccsessions
//!
//! Parsing and scanning never surface errors: an unreadable file or a malformed
//! line simply produces fewer sessions. The variants below cover the concerns
//! around that core, such as configuration, lookups, and output.
//!
//! # Example
//!
//! ```
//! use ccsessions_core::error::{CcsessionsError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CcsessionsError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//!
//! assert!(matches!(example_function(), Err(CcsessionsError::Io(_))));
//! ```

use thiserror::Error;

/// Main error type for ccsessions operations
#[derive(Error, Debug)]
pub enum CcsessionsError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// No session with the requested identifier
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A background scan task failed to complete
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Convenience type alias for Results in ccsessions
pub type Result<T> = std::result::Result<T, CcsessionsError>;
