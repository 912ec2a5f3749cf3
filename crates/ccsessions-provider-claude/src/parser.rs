//! Session log parser
//!
//! Reads one JSONL session log and folds its records into a single [`Session`].
//! Parsing is best effort: lines that fail to decode are skipped, unknown record
//! types are ignored, and a file that never reports a timestamp produces no
//! session at all.
//!
//! # Examples
//!
//! ```
//! use ccsessions_core::types::SessionId;
//! use ccsessions_provider_claude::{ProjectResolver, SessionParser};
//!
//! let parser = SessionParser::new(ProjectResolver::new("/Users/alice"));
//! let log = r#"{"type":"user","timestamp":"2024-05-01T09:00:00Z","message":{"content":"Hello"}}"#;
//!
//! let session = parser
//!     .parse_content(SessionId::new("s1"), log, log.len() as u64, "-Users-alice")
//!     .unwrap();
//! assert_eq!(session.project, "Chat");
//! assert_eq!(session.title, "Hello");
//! ```

use crate::attribution::{Evidence, ProjectResolver};
use crate::sanitize::{summary_from, title_from};
use ccsessions_core::types::{
    ISOTimestamp, MessageContent, ModelName, RawMessage, RawRecord, Session, SessionId,
    TokenCounts,
};
use ccsessions_pricing::CostCalculator;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};

/// User messages kept for titles, summaries and content mining
const MAX_USER_MESSAGES: usize = 5;

/// Tool input keys that carry file paths
const PATH_KEYS: [&str; 3] = ["file_path", "path", "notebook_path"];

/// Git branch value reported for a detached head
const DETACHED_HEAD: &str = "HEAD";

/// Running totals for one session log
#[derive(Debug, Default)]
struct SessionAccumulator {
    timestamp: Option<ISOTimestamp>,
    cwd: Option<String>,
    git_branch: Option<String>,
    model: Option<String>,
    user_messages: Vec<String>,
    user_count: u64,
    assistant_count: u64,
    tokens: TokenCounts,
    tool_counts: HashMap<String, u64>,
    tool_paths: Vec<String>,
    duration_ms: u64,
}

impl SessionAccumulator {
    fn ingest(&mut self, record: RawRecord) {
        if self.timestamp.is_none() {
            self.timestamp = record.timestamp.as_deref().and_then(ISOTimestamp::parse);
        }
        if self.cwd.is_none() {
            self.cwd = record.cwd.filter(|cwd| !cwd.is_empty());
        }
        if self.git_branch.is_none() {
            self.git_branch = record
                .git_branch
                .filter(|branch| !branch.is_empty() && branch != DETACHED_HEAD);
        }

        match record.record_type.as_deref() {
            Some("user") => self.ingest_user(record.message),
            Some("assistant") => self.ingest_assistant(record.message),
            Some("system") => {
                if record.subtype.as_deref() == Some("turn_duration") {
                    self.duration_ms += record.duration_ms.unwrap_or(0);
                }
            }
            _ => {}
        }
    }

    fn ingest_user(&mut self, message: Option<RawMessage>) {
        self.user_count += 1;
        if self.user_messages.len() >= MAX_USER_MESSAGES {
            return;
        }

        let text = match message.and_then(|m| m.content) {
            Some(MessageContent::Text(text)) => Some(text).filter(|t| !t.is_empty()),
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .find_map(|block| block.as_text())
                .map(str::to_string),
            None => None,
        };
        if let Some(text) = text {
            self.user_messages.push(text);
        }
    }

    fn ingest_assistant(&mut self, message: Option<RawMessage>) {
        self.assistant_count += 1;
        let Some(message) = message else {
            return;
        };

        if self.model.is_none() {
            self.model = message.model.filter(|m| !m.is_empty());
        }
        if let Some(usage) = &message.usage {
            self.tokens += TokenCounts::from(usage);
        }

        let Some(content) = &message.content else {
            return;
        };
        for block in content.blocks() {
            let Some(tool) = block.tool_name() else {
                continue;
            };
            *self.tool_counts.entry(tool.to_string()).or_insert(0) += 1;

            for key in PATH_KEYS {
                if let Some(path) = block.input_str(key)
                    && path.starts_with('/')
                {
                    self.tool_paths.push(path.to_string());
                }
            }
        }
    }

    fn finish(
        self,
        id: SessionId,
        size_bytes: u64,
        session_dir: &str,
        resolver: &ProjectResolver,
    ) -> Option<Session> {
        let Some(timestamp) = self.timestamp else {
            trace!("Session {} has no timestamp, skipping", id);
            return None;
        };

        let evidence = Evidence {
            tool_paths: &self.tool_paths,
            cwd: self.cwd.as_deref(),
            session_dir,
            user_messages: &self.user_messages,
            tool_calls: self.tool_counts.values().sum(),
        };
        let project = resolver.resolve(&evidence);

        let model = ModelName::new(self.model.unwrap_or_default());
        let estimated_cost = CostCalculator::calculate_cost(&self.tokens, &model);

        Some(Session {
            id,
            timestamp,
            project,
            cwd: self.cwd.unwrap_or_else(|| "~".to_string()),
            title: title_from(&self.user_messages),
            summary: summary_from(&self.user_messages),
            size_bytes,
            user_messages: self.user_count,
            assistant_messages: self.assistant_count,
            tokens: self.tokens,
            tool_counts: self.tool_counts,
            model,
            duration_ms: self.duration_ms,
            git_branch: self.git_branch.unwrap_or_default(),
            estimated_cost,
        })
    }
}

/// Builds [`Session`] records from log files
#[derive(Debug, Clone)]
pub struct SessionParser {
    resolver: ProjectResolver,
}

impl SessionParser {
    /// Create a parser that attributes projects with `resolver`
    pub fn new(resolver: ProjectResolver) -> Self {
        Self { resolver }
    }

    /// The resolver used for project attribution
    pub fn resolver(&self) -> &ProjectResolver {
        &self.resolver
    }

    /// Parse a session log file
    ///
    /// `session_dir` is the name of the workspace directory holding the file.
    /// Returns `None` when the file cannot be read or never reports a
    /// timestamp.
    pub fn parse(&self, path: &Path, session_dir: &str) -> Option<Session> {
        let id = path.file_stem()?.to_string_lossy().into_owned();

        let size_bytes = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                trace!("Cannot stat {}: {}", path.display(), e);
                return None;
            }
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                trace!("Cannot read {}: {}", path.display(), e);
                return None;
            }
        };
        let content = String::from_utf8_lossy(&bytes);

        let session = self.parse_content(SessionId::new(id), &content, size_bytes, session_dir);
        if let Some(session) = &session {
            debug!(
                "Parsed session {} ({} user, {} assistant messages, project '{}')",
                session.id, session.user_messages, session.assistant_messages, session.project
            );
        }
        session
    }

    /// Parse log content that has already been read
    pub fn parse_content(
        &self,
        id: SessionId,
        content: &str,
        size_bytes: u64,
        session_dir: &str,
    ) -> Option<Session> {
        let mut accumulator = SessionAccumulator::default();
        let mut skipped = 0usize;

        for (line_number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRecord>(line) {
                Ok(record) => accumulator.ingest(record),
                Err(e) => {
                    skipped += 1;
                    trace!("Skipping line {} of session {}: {}", line_number + 1, id, e);
                }
            }
        }

        if skipped > 0 {
            debug!("Skipped {} undecodable lines in session {}", skipped, id);
        }

        accumulator.finish(id, size_bytes, session_dir, &self.resolver)
    }
}
