//! Common test utilities and helpers for ccsessions tests
//!
//! Integration tests describe session logs with [`SessionLogBuilder`] and write
//! them into a temporary projects directory laid out the way Claude Code lays
//! out `~/.claude/projects`.

#![allow(dead_code)]

use ccsessions_provider_claude::{DataLoader, ProjectResolver};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Home directory used by every test resolver
pub const TEST_HOME: &str = "/Users/alice";

/// Builder for one JSONL session log
pub struct SessionLogBuilder {
    id: String,
    start: DateTime<Utc>,
    cwd: Option<String>,
    git_branch: Option<String>,
    lines: Vec<String>,
    step: i64,
}

impl SessionLogBuilder {
    /// Create a builder whose first record is stamped `start`
    pub fn new(id: &str, start: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            start,
            cwd: None,
            git_branch: None,
            lines: Vec::new(),
            step: 0,
        }
    }

    /// Working directory reported on every following record
    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    /// Git branch reported on every following record
    pub fn branch(mut self, branch: &str) -> Self {
        self.git_branch = Some(branch.to_string());
        self
    }

    fn next_timestamp(&mut self) -> String {
        let ts = self.start + Duration::seconds(self.step * 30);
        self.step += 1;
        ts.to_rfc3339()
    }

    fn push(&mut self, mut record: Value) {
        record["timestamp"] = json!(self.next_timestamp());
        if let Some(cwd) = &self.cwd {
            record["cwd"] = json!(cwd);
        }
        if let Some(branch) = &self.git_branch {
            record["gitBranch"] = json!(branch);
        }
        self.lines.push(record.to_string());
    }

    /// Plain-text user message
    pub fn user(mut self, text: &str) -> Self {
        self.push(json!({
            "type": "user",
            "message": { "role": "user", "content": text },
        }));
        self
    }

    /// Assistant reply with usage
    pub fn assistant(mut self, model: &str, input: u64, output: u64, text: &str) -> Self {
        self.push(json!({
            "type": "assistant",
            "message": {
                "model": model,
                "usage": { "input_tokens": input, "output_tokens": output },
                "content": [{ "type": "text", "text": text }],
            },
        }));
        self
    }

    /// Assistant turn that calls one tool with a `file_path` argument
    pub fn tool_call(mut self, model: &str, tool: &str, file_path: &str) -> Self {
        self.push(json!({
            "type": "assistant",
            "message": {
                "model": model,
                "usage": { "input_tokens": 0, "output_tokens": 0 },
                "content": [{
                    "type": "tool_use",
                    "name": tool,
                    "input": { "file_path": file_path },
                }],
            },
        }));
        self
    }

    /// Turn duration record
    pub fn turn_duration(mut self, duration_ms: u64) -> Self {
        self.push(json!({
            "type": "system",
            "subtype": "turn_duration",
            "durationMs": duration_ms,
        }));
        self
    }

    /// A line written verbatim
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Rendered log contents
    pub fn content(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }

    /// Write the log as `<root>/<workspace_dir>/<id>.jsonl`
    pub fn write(&self, root: &Path, workspace_dir: &str) -> PathBuf {
        let dir = root.join(workspace_dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.jsonl", self.id));
        fs::write(&path, self.content()).unwrap();
        path
    }
}

/// Temporary projects directory plus a loader reading it
pub fn test_loader() -> (TempDir, DataLoader) {
    let temp_dir = TempDir::new().unwrap();
    let loader = DataLoader::new(temp_dir.path().to_path_buf(), ProjectResolver::new(TEST_HOME));
    (temp_dir, loader)
}

/// A start time a few minutes in the past, inside any recency window
pub fn recent(minutes_ago: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes_ago)
}
