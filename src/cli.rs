//! CLI interface for ccsessions
//!
//! This module defines the command-line interface using clap. Every
//! subcommand reads the same session collection; global flags choose where the
//! logs live, how far back to look, and which timezone answers calendar
//! questions.
//!
//! When the subcommand is omitted, `list` runs with no filters.
//!
//! # Example
//!
//! ```bash
//! # Sessions from today mentioning "migration"
//! ccsessions list --today --search migration
//!
//! # Everything from the last 30 days, grouped by day, as JSON
//! ccsessions --days 30 --json days
//!
//! # Details of one session
//! ccsessions show 5c1f0e2a-9d1b-4a47-b1a8-2f6f1f0d9e11
//! ```

use crate::filters::{Collection, SessionFilter};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Browse Claude Code sessions from local JSONL logs
#[derive(Parser, Debug, Clone)]
#[command(name = "ccsessions")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding per-workspace session folders
    /// (defaults to $CLAUDE_CONFIG_DIR/projects or ~/.claude/projects)
    #[arg(long, env = "CCSESSIONS_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Only include sessions from the last N days (0 for no limit)
    #[arg(long, default_value = "7", global = true)]
    pub days: u64,

    /// Timezone for calendar views (e.g. "America/New_York", "Asia/Tokyo", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for calendar views (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Recency window implied by `--days`; zero means unbounded
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.days.saturating_mul(SECONDS_PER_DAY))
    }
}

/// Search and collection flags shared by the session views
#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("collection").multiple(false)))]
pub struct FilterArgs {
    /// Case-insensitive text to match in title, summary or project
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only sessions started today
    #[arg(long, group = "collection")]
    pub today: bool,

    /// Only sessions started this week (Monday start)
    #[arg(long, group = "collection")]
    pub week: bool,

    /// Only sessions above 100K total tokens
    #[arg(long, group = "collection")]
    pub large: bool,

    /// Only sessions attributed to this project
    #[arg(long, short = 'p', group = "collection")]
    pub project: Option<String>,
}

impl FilterArgs {
    /// The collection selected by the flags
    pub fn collection(&self) -> Collection {
        if self.today {
            Collection::Today
        } else if self.week {
            Collection::ThisWeek
        } else if self.large {
            Collection::LargeSessions
        } else if let Some(project) = &self.project {
            Collection::Project(project.clone())
        } else {
            Collection::All
        }
    }

    /// Build the filter these flags describe
    pub fn to_filter(&self) -> SessionFilter {
        let filter = SessionFilter::new().with_collection(self.collection());
        match &self.search {
            Some(search) => filter.with_search(search.clone()),
            None => filter,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List sessions, newest first
    List(FilterArgs),

    /// List sessions grouped by calendar day
    Days(FilterArgs),

    /// Show project labels with their session counts
    Projects,

    /// Show collection counts and totals
    Stats(FilterArgs),

    /// Show the details of one session
    Show {
        /// Session identifier (the log file name without extension)
        id: String,
    },

    /// Rescan periodically and reprint the session list
    Watch {
        /// Seconds between rescans
        #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

impl Command {
    /// Filter flags given to this command, if it takes any
    pub fn filter_args(&self) -> Option<&FilterArgs> {
        match self {
            Command::List(args) | Command::Days(args) | Command::Stats(args) => Some(args),
            Command::Watch { filter, .. } => Some(filter),
            Command::Projects | Command::Show { .. } => None,
        }
    }
}
