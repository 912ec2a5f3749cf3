//! Project attribution for sessions
//!
//! A session log does not name its project. The label is inferred from the
//! evidence a session leaves behind, trying independent strategies in a fixed
//! order until one produces a label:
//!
//! 1. files touched by tool calls, when one project is referenced at least twice
//! 2. the recorded working directory
//! 3. the workspace directory name, which is the working directory with `/`
//!    replaced by `-`
//! 4. repository URLs and paths mentioned in the user's messages
//! 5. `Chat` for sessions that never used a tool, `Home` otherwise
//!
//! Every strategy maps paths to labels with the same rule: take the path
//! relative to the home directory and pick its first component that is not a
//! generic container such as `Projects` or `src`.
//!
//! # Examples
//!
//! ```
//! use ccsessions_provider_claude::attribution::{Evidence, ProjectResolver};
//!
//! let resolver = ProjectResolver::new("/Users/alice");
//! assert_eq!(
//!     resolver.project_from_path("/Users/alice/Projects/website/index.html", false),
//!     Some("website".to_string())
//! );
//!
//! let evidence = Evidence {
//!     cwd: Some("/Users/alice/code-review"),
//!     ..Evidence::default()
//! };
//! assert_eq!(resolver.resolve(&evidence), "code-review");
//! ```

use ccsessions_core::error::{CcsessionsError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Label for sessions without any tool activity
pub const CHAT: &str = "Chat";

/// Label for sessions that used tools but point at no project
pub const HOME: &str = "Home";

/// Dotfile directory holding the tool's own configuration
const CONFIG_DIR: &str = ".claude";

/// Directory names that group projects rather than name one
const CONTAINER_DIRS: [&str; 8] = [
    "Projects",
    "Developer",
    "Documents",
    "Desktop",
    "Code",
    "repos",
    "src",
    "work",
];

/// Character that replaces `/` in workspace directory names
const PATH_ESCAPE: char = '-';

/// Minimum references before the tool-path vote is trusted
const MIN_PATH_VOTES: usize = 2;

static REPO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:github|gitlab)\.com/[^/\s]+/([^/\s?#]+)").expect("valid repository url pattern")
});

static HOME_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:~/|/Users/[^/\s]+/|/home/[^/\s]+/)[^\s,;"'\]\)>]+"#)
        .expect("valid home path pattern")
});

/// Everything a session reveals about where it was run
#[derive(Debug, Default, Clone, Copy)]
pub struct Evidence<'a> {
    /// Absolute paths passed to tool calls, in call order
    pub tool_paths: &'a [String],
    /// First non-empty working directory
    pub cwd: Option<&'a str>,
    /// Name of the workspace directory holding the log file
    pub session_dir: &'a str,
    /// Raw user message snippets
    pub user_messages: &'a [String],
    /// Number of tool calls of any kind
    pub tool_calls: u64,
}

/// Occurrence counts that remember first-seen order
///
/// Ties go to the label that was seen first.
#[derive(Debug, Default)]
struct Tally {
    counts: Vec<(String, usize)>,
}

impl Tally {
    fn add(&mut self, label: String) {
        match self.counts.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label, 1)),
        }
    }

    fn leader(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in &self.counts {
            if best.is_none_or(|(_, top)| *count > top) {
                best = Some((label.as_str(), *count));
            }
        }
        best
    }
}

type Strategy = fn(&ProjectResolver, &Evidence<'_>) -> Option<String>;

/// Strategies in priority order
const STRATEGIES: [(&str, Strategy); 4] = [
    ("tool-paths", ProjectResolver::from_tool_paths),
    ("cwd", ProjectResolver::from_cwd),
    ("session-dir", ProjectResolver::from_session_dir),
    ("content", ProjectResolver::from_content),
];

/// Infers project labels relative to a home directory
#[derive(Debug, Clone)]
pub struct ProjectResolver {
    home: String,
}

impl ProjectResolver {
    /// Create a resolver for the given home directory
    pub fn new(home: impl Into<String>) -> Self {
        let mut home = home.into();
        while home.len() > 1 && home.ends_with('/') {
            home.pop();
        }
        Self { home }
    }

    /// Create a resolver for the current user's home directory
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or(CcsessionsError::NoHomeDirectory)?;
        Ok(Self::new(home.to_string_lossy()))
    }

    /// Home directory used for relative paths
    pub fn home(&self) -> &str {
        &self.home
    }

    /// Map a path under the home directory to a project label
    ///
    /// Accepts absolute paths under home and `~/` paths. With
    /// `require_children` the label must be followed by at least one more
    /// path component, so a file directly inside a container does not count.
    pub fn project_from_path(&self, path: &str, require_children: bool) -> Option<String> {
        let relative = path
            .strip_prefix(self.home.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .or_else(|| path.strip_prefix("~/"))?;

        let components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();

        if components.len() >= 2 && components[0] == CONFIG_DIR {
            let label = match components[1] {
                sub @ ("skills" | "rules" | "memory") => sub,
                "projects" if components.get(3) == Some(&"memory") => "memory",
                _ => CONFIG_DIR,
            };
            return Some(label.to_string());
        }

        let (index, component) = components
            .iter()
            .enumerate()
            .find(|(_, c)| !CONTAINER_DIRS.contains(*c))?;

        if require_children && index + 1 == components.len() {
            return None;
        }
        Some(component.to_string())
    }

    /// Resolve the project label for a session
    pub fn resolve(&self, evidence: &Evidence<'_>) -> String {
        for (name, strategy) in STRATEGIES {
            if let Some(label) = strategy(self, evidence) {
                trace!("Project '{}' resolved by {} strategy", label, name);
                return label;
            }
            trace!("Strategy {} found no project", name);
        }

        Self::fallback(evidence).to_string()
    }

    fn from_tool_paths(&self, evidence: &Evidence<'_>) -> Option<String> {
        let mut tally = Tally::default();
        for path in evidence.tool_paths {
            if let Some(label) = self.project_from_path(path, true) {
                tally.add(label);
            }
        }

        let (label, votes) = tally.leader()?;
        (votes >= MIN_PATH_VOTES).then(|| label.to_string())
    }

    fn from_cwd(&self, evidence: &Evidence<'_>) -> Option<String> {
        let cwd = evidence.cwd?;
        if cwd.is_empty() || cwd == self.home || cwd == "~" {
            return None;
        }
        self.project_from_path(cwd, false)
            .filter(|label| label != HOME)
    }

    fn from_session_dir(&self, evidence: &Evidence<'_>) -> Option<String> {
        let escaped_home = self.home.replace('/', &PATH_ESCAPE.to_string());
        let remainder = evidence
            .session_dir
            .strip_prefix(escaped_home.as_str())
            .unwrap_or(evidence.session_dir);
        let remainder = remainder.strip_prefix(PATH_ESCAPE).unwrap_or(remainder);
        if remainder.is_empty() {
            return None;
        }

        let decoded = format!("{}/{}", self.home, remainder.replace(PATH_ESCAPE, "/"));
        let label = self
            .project_from_path(&decoded, false)
            .unwrap_or_else(|| remainder.to_string());
        (label != HOME).then_some(label)
    }

    fn from_content(&self, evidence: &Evidence<'_>) -> Option<String> {
        let mut tally = Tally::default();
        for message in evidence.user_messages {
            for captures in REPO_URL.captures_iter(message) {
                if let Some(repo) = captures.get(1) {
                    let repo = repo.as_str();
                    tally.add(repo.strip_suffix(".git").unwrap_or(repo).to_string());
                }
            }
            for path in HOME_PATH.find_iter(message) {
                if let Some(label) = self.project_from_path(path.as_str(), false) {
                    tally.add(label);
                }
            }
        }

        tally.leader().map(|(label, _)| label.to_string())
    }

    fn fallback(evidence: &Evidence<'_>) -> &'static str {
        if evidence.tool_paths.is_empty() && evidence.tool_calls == 0 {
            CHAT
        } else {
            HOME
        }
    }
}
