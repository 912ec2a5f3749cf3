//! Output formatting module for ccsessions
//!
//! This module provides formatters for displaying sessions in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! It also holds the compact display helpers used in tables: sizes, durations,
//! costs, token counts, tool names, paths and day headers.
//!
//! # Examples
//!
//! ```
//! use ccsessions::output::{format_cost, format_duration, format_size, format_tokens};
//!
//! assert_eq!(format_size(2048), "2K");
//! assert_eq!(format_duration(3_900_000), "1h 5m");
//! assert_eq!(format_cost(0.004), "<$0.01");
//! assert_eq!(format_tokens(1_300_000), "1.3M");
//! ```

use crate::filters::DayGroup;
use crate::model_formatter::format_model;
use crate::store::StoreStats;
use ccsessions_core::error::Result;
use ccsessions_core::timezone::TimezoneConfig;
use ccsessions_core::types::{DailyDate, Session};
use chrono::{DateTime, Utc};
use colored::Colorize;
use prettytable::{Cell, Row, Table, format, row};
use serde::Serialize;
use serde_json::json;

/// Format a byte count as `B`, whole `K`, or `M` with one decimal
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes}B")
    } else if bytes < MIB {
        format!("{}K", bytes / KIB)
    } else {
        format!("{:.1}M", bytes as f64 / MIB as f64)
    }
}

/// Format a duration in milliseconds as seconds, minutes, or hours and minutes
pub fn format_duration(duration_ms: u64) -> String {
    let seconds = duration_ms / 1000;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{hours}h"),
        rest => format!("{hours}h {rest}m"),
    }
}

/// Format an estimated cost, collapsing anything below a cent
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        "<$0.01".to_string()
    } else {
        format!("${cost:.2}")
    }
}

/// Format a token count as a plain number, whole thousands, or millions
pub fn format_tokens(tokens: u64) -> String {
    if tokens < 1_000 {
        tokens.to_string()
    } else if tokens < 1_000_000 {
        format!("{}K", tokens / 1_000)
    } else {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    }
}

/// Strip the server prefix from MCP tool names
///
/// `mcp__github__create_issue` becomes `create_issue` and `mcp__lookup`
/// becomes `lookup`. Other names are kept.
pub fn format_tool_name(name: &str) -> &str {
    match name.strip_prefix("mcp__") {
        Some(rest) if !rest.is_empty() => rest
            .rsplit_once("__")
            .map_or(rest, |(_, tool)| tool),
        _ => name,
    }
}

/// Show paths under `home` relative to `~`
pub fn display_path(path: &str, home: &str) -> String {
    if path == home {
        return "~".to_string();
    }
    match path.strip_prefix(home).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => format!("~/{rest}"),
        None => path.to_string(),
    }
}

/// Header for a day group relative to `today`
pub fn day_header(date: &DailyDate, today: &DailyDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.inner().pred_opt() == Some(*date.inner()) {
        return "Yesterday".to_string();
    }
    date.format("%A, %-d %B")
}

/// Everything a formatter needs besides the data itself
#[derive(Debug, Clone)]
pub struct DisplayContext {
    /// Zone for times and day headers
    pub tz: TimezoneConfig,
    /// Home directory for shortening paths
    pub home: String,
    /// Reference time for "Today" and "Yesterday"
    pub now: DateTime<Utc>,
}

impl DisplayContext {
    pub fn new(tz: TimezoneConfig, home: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            tz,
            home: home.into(),
            now,
        }
    }

    fn local_time(&self, session: &Session, fmt: &str) -> String {
        session
            .timestamp
            .inner()
            .with_timezone(&self.tz.tz)
            .format(fmt)
            .to_string()
    }
}

/// Trait for output formatters
///
/// Implementations render the store's views. All methods return the complete
/// text to print, or the serialization error that prevented it.
pub trait OutputFormatter {
    /// Format a flat list of sessions
    fn format_sessions(&self, sessions: &[&Session], ctx: &DisplayContext) -> Result<String>;

    /// Format sessions grouped by day
    fn format_days(&self, days: &[DayGroup<'_>], ctx: &DisplayContext) -> Result<String>;

    /// Format project labels with their session counts
    fn format_projects(&self, projects: &[(&str, usize)]) -> Result<String>;

    /// Format collection statistics
    fn format_stats(&self, stats: &StoreStats) -> Result<String>;

    /// Format the details of one session
    fn format_session(&self, session: &Session, ctx: &DisplayContext) -> Result<String>;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    fn session_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Time",
            b -> "Project",
            b -> "Title",
            b -> "Model",
            b -> "Tokens",
            b -> "Cost",
            b -> "Duration",
            b -> "Size"
        ]);
        table
    }

    fn session_row(session: &Session, ctx: &DisplayContext, time_format: &str) -> Row {
        row![
            ctx.local_time(session, time_format),
            session.project,
            session.title,
            format_model(&session.model),
            r -> format_tokens(session.total_tokens()),
            r -> format_cost(session.estimated_cost),
            r -> format_duration(session.duration_ms),
            r -> format_size(session.size_bytes)
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_sessions(&self, sessions: &[&Session], ctx: &DisplayContext) -> Result<String> {
        if sessions.is_empty() {
            return Ok("No sessions found.\n".to_string());
        }

        let mut table = Self::session_table();
        for session in sessions {
            table.add_row(Self::session_row(session, ctx, "%Y-%m-%d %H:%M"));
        }

        let total_cost: f64 = sessions.iter().map(|s| s.estimated_cost).sum();
        table.add_row(Row::new(vec![Cell::new(""); 8]));
        table.add_row(row![
            b -> format!("{} sessions", sessions.len()),
            "",
            "",
            "",
            r -> format_tokens(sessions.iter().map(|s| s.total_tokens()).sum()),
            r -> format_cost(total_cost),
            "",
            r -> format_size(sessions.iter().map(|s| s.size_bytes).sum())
        ]);

        Ok(table.to_string())
    }

    fn format_days(&self, days: &[DayGroup<'_>], ctx: &DisplayContext) -> Result<String> {
        if days.is_empty() {
            return Ok("No sessions found.\n".to_string());
        }

        let today = ctx.tz.today(ctx.now);
        let mut output = String::new();
        for day in days {
            let header = day_header(&day.date, &today);
            output.push_str(&format!(
                "\n{} ({})\n",
                header.bold(),
                day.sessions.len()
            ));

            let mut table = Self::session_table();
            for session in &day.sessions {
                table.add_row(Self::session_row(session, ctx, "%H:%M"));
            }
            output.push_str(&table.to_string());
        }
        Ok(output)
    }

    fn format_projects(&self, projects: &[(&str, usize)]) -> Result<String> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Project", b -> "Sessions"]);
        for (project, count) in projects {
            table.add_row(row![project, r -> count]);
        }
        Ok(table.to_string())
    }

    fn format_stats(&self, stats: &StoreStats) -> Result<String> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP);
        table.add_row(row![b -> "Sessions", r -> stats.sessions]);
        table.add_row(row![b -> "Projects", r -> stats.projects]);
        table.add_row(row![b -> "Today", r -> stats.today]);
        table.add_row(row![b -> "This week", r -> stats.this_week]);
        table.add_row(row![b -> "Large sessions", r -> stats.large]);
        table.add_row(row![b -> "Messages", r -> stats.total_messages]);
        table.add_row(row![b -> "Log size", r -> format_size(stats.total_size)]);
        table.add_row(row![b -> "Estimated cost", r -> format_cost(stats.total_cost)]);
        Ok(table.to_string())
    }

    fn format_session(&self, session: &Session, ctx: &DisplayContext) -> Result<String> {
        let mut output = String::new();
        output.push_str(&format!("{}\n", session.title.bold()));
        output.push_str(&format!("{}\n\n", session.id.as_str().dimmed()));

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.add_row(row![b -> "Started", ctx.local_time(session, "%Y-%m-%d %H:%M %Z")]);
        table.add_row(row![b -> "Project", session.project]);
        table.add_row(row![b -> "Directory", display_path(&session.cwd, &ctx.home)]);
        if !session.git_branch.is_empty() {
            table.add_row(row![b -> "Branch", session.git_branch]);
        }
        table.add_row(row![b -> "Model", format_model(&session.model)]);
        table.add_row(row![
            b -> "Messages",
            format!("{} user, {} assistant", session.user_messages, session.assistant_messages)
        ]);
        table.add_row(row![
            b -> "Tokens",
            format!(
                "{} (input {}, output {}, cache read {}, cache write {})",
                format_tokens(session.total_tokens()),
                format_tokens(session.tokens.input_tokens),
                format_tokens(session.tokens.output_tokens),
                format_tokens(session.tokens.cache_read_tokens),
                format_tokens(session.tokens.cache_creation_tokens)
            )
        ]);
        table.add_row(row![b -> "Cost", format_cost(session.estimated_cost)]);
        table.add_row(row![b -> "Duration", format_duration(session.duration_ms)]);
        table.add_row(row![b -> "Size", format_size(session.size_bytes)]);
        output.push_str(&table.to_string());

        let tools = session.top_tools();
        if !tools.is_empty() {
            output.push_str(&format!("\n{}\n", "Tools".bold()));
            for (name, count) in tools {
                output.push_str(&format!("  {:<24} {}\n", format_tool_name(name), count));
            }
        }

        output.push_str(&format!("\n{}\n", "Summary".bold()));
        output.push_str(&format!("  {}\n", session.summary));
        output.push_str(&format!("\n{}\n", session.resume_command().cyan()));
        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    fn session_json(session: &Session, ctx: &DisplayContext) -> serde_json::Value {
        json!({
            "id": session.id.as_str(),
            "timestamp": session.timestamp.inner().to_rfc3339(),
            "date": ctx.tz.date_of(&session.timestamp).to_string(),
            "project": session.project,
            "cwd": session.cwd,
            "title": session.title,
            "summary": session.summary,
            "preview": session.preview(),
            "size_bytes": session.size_bytes,
            "user_messages": session.user_messages,
            "assistant_messages": session.assistant_messages,
            "tokens": {
                "input_tokens": session.tokens.input_tokens,
                "output_tokens": session.tokens.output_tokens,
                "cache_creation_tokens": session.tokens.cache_creation_tokens,
                "cache_read_tokens": session.tokens.cache_read_tokens,
                "total": session.total_tokens(),
            },
            "tools": session
                .top_tools()
                .into_iter()
                .map(|(name, count)| json!({ "name": name, "count": count }))
                .collect::<Vec<_>>(),
            "model": session.model.as_str(),
            "duration_ms": session.duration_ms,
            "git_branch": session.git_branch,
            "estimated_cost": session.estimated_cost,
            "resume_command": session.resume_command(),
        })
    }

    /// Pretty JSON ending in a newline, like the table output
    fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let mut output = serde_json::to_string_pretty(value)?;
        output.push('\n');
        Ok(output)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_sessions(&self, sessions: &[&Session], ctx: &DisplayContext) -> Result<String> {
        Self::render(&json!({
            "sessions": sessions
                .iter()
                .map(|s| Self::session_json(s, ctx))
                .collect::<Vec<_>>(),
            "totals": {
                "sessions": sessions.len(),
                "total_tokens": sessions.iter().map(|s| s.total_tokens()).sum::<u64>(),
                "estimated_cost": sessions.iter().map(|s| s.estimated_cost).sum::<f64>(),
            }
        }))
    }

    fn format_days(&self, days: &[DayGroup<'_>], ctx: &DisplayContext) -> Result<String> {
        Self::render(&json!({
            "days": days
                .iter()
                .map(|day| json!({
                    "date": day.date.to_string(),
                    "sessions": day
                        .sessions
                        .iter()
                        .map(|s| Self::session_json(s, ctx))
                        .collect::<Vec<_>>(),
                }))
                .collect::<Vec<_>>(),
        }))
    }

    fn format_projects(&self, projects: &[(&str, usize)]) -> Result<String> {
        Self::render(&json!({
            "projects": projects
                .iter()
                .map(|(project, count)| json!({ "project": project, "sessions": count }))
                .collect::<Vec<_>>(),
        }))
    }

    fn format_stats(&self, stats: &StoreStats) -> Result<String> {
        Self::render(stats)
    }

    fn format_session(&self, session: &Session, ctx: &DisplayContext) -> Result<String> {
        Self::render(&Self::session_json(session, ctx))
    }
}

/// Get appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
