//! Core types and utilities for ccsessions
//!
//! This crate provides the foundational types, error handling and timezone
//! configuration used by the other ccsessions crates.

pub mod error;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CcsessionsError, Result};
pub use types::{DailyDate, ISOTimestamp, ModelName, Session, SessionId, TokenCounts};
