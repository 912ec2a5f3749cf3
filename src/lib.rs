//! ccsessions - Browse Claude Code sessions from local JSONL logs
//!
//! This library provides functionality to:
//! - Discover session logs under a Claude projects directory
//! - Summarize each log into a [`Session`](types::Session) record with a title,
//!   a summary, token counts, tool usage and an estimated cost
//! - Attribute every session to a project
//! - Keep a session collection refreshed by background scans and query it
//! - Render sessions in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use ccsessions::{
//!     filters::{Collection, SessionFilter},
//!     store::SessionStore,
//!     timezone::TimezoneConfig,
//! };
//! use ccsessions_provider_claude::DataLoader;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ccsessions::Result<()> {
//!     let loader = DataLoader::discover(None)?;
//!     let mut store = SessionStore::new(
//!         loader,
//!         TimezoneConfig::default(),
//!         Duration::from_secs(7 * 86_400),
//!     );
//!
//!     store.request_scan();
//!     store.wait_until_loaded().await;
//!
//!     let filter = SessionFilter::new().with_collection(Collection::Today);
//!     for session in store.filtered(&filter, chrono::Utc::now()) {
//!         println!("{} {}", session.project, session.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod filters;
pub mod live_monitor;
pub mod model_formatter;
pub mod output;
pub mod store;

// Re-export core modules so the binary and tests can use one path
pub use ccsessions_core::{error, timezone, types};

// Re-export commonly used types
pub use ccsessions_core::{CcsessionsError, Result};
pub use ccsessions_core::types::{
    DailyDate, ISOTimestamp, ModelName, Session, SessionId, TokenCounts,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
