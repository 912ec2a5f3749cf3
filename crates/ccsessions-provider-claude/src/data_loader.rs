//! Data loader module for discovering and parsing session logs
//!
//! Claude Code writes one JSONL file per session into a workspace directory
//! below `~/.claude/projects`, where each workspace directory is named after the
//! working directory with `/` replaced by `-`:
//!
//! ```text
//! ~/.claude/projects/
//! ├── -Users-alice-Projects-atlas/
//! │   ├── 0b9e6f5c-....jsonl
//! │   └── 7d1f20aa-....jsonl
//! └── -Users-alice/
//!     └── c41e9b02-....jsonl
//! ```
//!
//! The root can be overridden with `CLAUDE_CONFIG_DIR` (its `projects`
//! subdirectory is used) or passed explicitly.
//!
//! Discovery never fails: a missing or unreadable directory simply contributes
//! no files. Files whose modification time is older than the recency window are
//! skipped before they are read.
//!
//! # Examples
//!
//! ```no_run
//! use ccsessions_provider_claude::data_loader::DataLoader;
//! use std::time::Duration;
//!
//! # fn example() -> ccsessions_core::Result<()> {
//! let loader = DataLoader::discover(None)?;
//! let week = Duration::from_secs(7 * 24 * 60 * 60);
//! for session in loader.load_sessions(week) {
//!     println!("{} {} {}", session.timestamp.inner(), session.project, session.title);
//! }
//! # Ok(())
//! # }
//! ```

use crate::attribution::ProjectResolver;
use crate::parser::SessionParser;
use ccsessions_core::error::{CcsessionsError, Result};
use ccsessions_core::types::Session;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// File extension of session logs
const LOG_EXTENSION: &str = "jsonl";

/// A session log found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    /// Path to the log file
    pub path: PathBuf,
    /// Name of the workspace directory holding the file
    pub workspace_dir: String,
}

/// Start of the recency window, `None` for an unbounded window
///
/// A zero `window` means unbounded.
pub fn window_start(window: Duration, now: SystemTime) -> Option<SystemTime> {
    if window.is_zero() {
        None
    } else {
        Some(now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH))
    }
}

/// True when a file modified at `modified` predates `since`
///
/// Files whose modification time cannot be read are kept.
fn is_stale(modified: Option<SystemTime>, since: Option<SystemTime>) -> bool {
    since.is_some_and(|since| modified.is_some_and(|modified| modified < since))
}

/// Discovers session logs under a root and parses them into sessions
pub struct DataLoader {
    root: PathBuf,
    parser: SessionParser,
}

impl DataLoader {
    /// Create a loader for an explicit root
    pub fn new(root: PathBuf, resolver: ProjectResolver) -> Self {
        Self {
            root,
            parser: SessionParser::new(resolver),
        }
    }

    /// Create a loader for `root`, or the default root when `None`
    ///
    /// # Errors
    ///
    /// Returns [`CcsessionsError::NoHomeDirectory`] when the home directory
    /// cannot be determined.
    pub fn discover(root: Option<PathBuf>) -> Result<Self> {
        let resolver = ProjectResolver::from_env()?;
        let root = match root {
            Some(root) => root,
            None => default_root(
                std::env::var_os("CLAUDE_CONFIG_DIR"),
                Some(PathBuf::from(resolver.home())),
            )?,
        };
        debug!("Using session root {}", root.display());
        Ok(Self::new(root, resolver))
    }

    /// The directory holding workspace directories
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The parser used for each log file
    pub fn parser(&self) -> &SessionParser {
        &self.parser
    }

    /// Find session logs modified within `window`
    ///
    /// Only files directly inside a workspace directory are considered. The
    /// result is ordered by path.
    pub fn find_session_files(&self, window: Duration) -> Vec<SessionFile> {
        let since = window_start(window, SystemTime::now());

        if !self.root.is_dir() {
            warn!("Session root {} is not a readable directory", self.root.display());
            return Vec::new();
        }

        let mut files = Vec::new();
        let mut stale = 0usize;
        let walker = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(LOG_EXTENSION)
            {
                continue;
            }

            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            if is_stale(modified, since) {
                stale += 1;
                continue;
            }

            let Some(workspace_dir) = path
                .parent()
                .and_then(|parent| parent.file_name())
                .map(|name| name.to_string_lossy().into_owned())
            else {
                continue;
            };

            files.push(SessionFile {
                path: path.to_path_buf(),
                workspace_dir,
            });
        }

        info!(
            "Found {} session files to process ({} outside the recency window)",
            files.len(),
            stale
        );
        files
    }

    /// Discover and parse sessions within `window`
    ///
    /// Files are parsed in parallel. Sessions whose first timestamp falls
    /// before the window are dropped. The result is sorted newest first.
    pub fn load_sessions(&self, window: Duration) -> Vec<Session> {
        let files = self.find_session_files(window);
        let since: Option<DateTime<Utc>> =
            window_start(window, SystemTime::now()).map(DateTime::<Utc>::from);

        let mut sessions: Vec<Session> = files
            .par_iter()
            .filter_map(|file| self.parser.parse(&file.path, &file.workspace_dir))
            .filter(|session| since.is_none_or(|since| *session.timestamp.inner() >= since))
            .collect();

        sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        info!(
            "Loaded {} sessions from {} files",
            sessions.len(),
            files.len()
        );
        sessions
    }
}

/// Resolve the default session root
///
/// `$CLAUDE_CONFIG_DIR/projects` when the variable is set and non-empty,
/// otherwise `~/.claude/projects`.
pub fn default_root(config_dir: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(config_dir) = config_dir.filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(config_dir).join("projects"));
    }
    let home = home.ok_or(CcsessionsError::NoHomeDirectory)?;
    Ok(home.join(".claude").join("projects"))
}
