//! Claude Code session log provider for ccsessions
//!
//! This crate turns the JSONL session logs written by Claude Code into
//! [`Session`](ccsessions_core::types::Session) summaries: it discovers log
//! files, parses them leniently, cleans up message text, and infers which
//! project each session belongs to.

pub mod attribution;
pub mod data_loader;
pub mod parser;
pub mod sanitize;

pub use attribution::{Evidence, ProjectResolver};
pub use data_loader::{DataLoader, SessionFile};
pub use parser::SessionParser;
