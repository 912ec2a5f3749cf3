//! Core domain types for ccsessions
//!
//! This module contains the fundamental types used throughout the ccsessions crates.
//! Strongly-typed wrappers cover identifiers, timestamps and token counts, the raw
//! JSONL record shapes are decoded leniently, and [`Session`] is the summary record
//! built once per log file.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Strongly-typed model name wrapper
///
/// # Examples
/// ```
/// use ccsessions_core::types::ModelName;
///
/// let model = ModelName::new("claude-opus-4-6");
/// assert_eq!(model.as_str(), "claude-opus-4-6");
/// assert!(!model.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no assistant record reported a model
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed session ID wrapper
///
/// A session ID is the base name of the log file without its extension.
///
/// # Examples
/// ```
/// use ccsessions_core::types::SessionId;
///
/// let session = SessionId::new("550e8400-e29b-41d4-a716-446655440000");
/// assert_eq!(session.as_str(), "550e8400-e29b-41d4-a716-446655440000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO timestamp wrapper for UTC timestamps
///
/// # Examples
/// ```
/// use ccsessions_core::types::ISOTimestamp;
///
/// let ts = ISOTimestamp::parse("2024-01-15T10:30:00.123Z").unwrap();
/// assert_eq!(ts.to_daily_date_with_tz(&chrono_tz::UTC).format("%Y-%m-%d"), "2024-01-15");
///
/// // Fractional seconds are optional
/// assert!(ISOTimestamp::parse("2024-01-15T10:30:00Z").is_some());
/// assert!(ISOTimestamp::parse("yesterday").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 timestamp, with or without fractional seconds
    pub fn parse(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date of this instant in `tz`
    pub fn to_daily_date_with_tz(&self, tz: &Tz) -> DailyDate {
        DailyDate::new(self.0.with_timezone(tz).date_naive())
    }
}

/// Calendar date used to bucket sessions by day
///
/// # Examples
/// ```
/// use ccsessions_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(daily.format("%Y-%m-%d"), "2024-01-15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Token counts summed across a session
///
/// # Examples
/// ```
/// use ccsessions_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(100, 50, 10, 5);
/// assert_eq!(tokens.total(), 165);
///
/// let combined = tokens + TokenCounts::new(50, 25, 5, 2);
/// assert_eq!(combined.input_tokens, 150);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCounts {
    /// Input tokens used
    pub input_tokens: u64,
    /// Output tokens generated
    pub output_tokens: u64,
    /// Cache creation tokens
    pub cache_creation_tokens: u64,
    /// Cache read tokens
    pub cache_read_tokens: u64,
}

impl TokenCounts {
    /// Create new TokenCounts
    pub fn new(
        input_tokens: u64,
        output_tokens: u64,
        cache_creation_tokens: u64,
        cache_read_tokens: u64,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_creation_tokens + self.cache_read_tokens
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            cache_creation_tokens: self.cache_creation_tokens + other.cache_creation_tokens,
            cache_read_tokens: self.cache_read_tokens + other.cache_read_tokens,
        }
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_creation_tokens += other.cache_creation_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
    }
}

impl From<&RawUsage> for TokenCounts {
    fn from(usage: &RawUsage) -> Self {
        Self {
            input_tokens: usage.input_tokens.unwrap_or(0),
            output_tokens: usage.output_tokens.unwrap_or(0),
            cache_creation_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
            cache_read_tokens: usage.cache_read_input_tokens.unwrap_or(0),
        }
    }
}

/// Deserialize a field, mapping any shape mismatch to `None`
///
/// The log producer adds and reshapes fields over time. A field whose value
/// does not fit the expected type is treated as absent instead of failing the
/// whole line.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Token usage attached to an assistant message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_creation_input_tokens: Option<u64>,
}

/// One typed block inside an array-shaped message content
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub block_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub input: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ContentBlock {
    fn is(&self, kind: &str) -> bool {
        self.block_type.as_deref() == Some(kind)
    }

    /// Text of a non-empty `text` block
    pub fn as_text(&self) -> Option<&str> {
        if !self.is("text") {
            return None;
        }
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Tool name of a `tool_use` block
    pub fn tool_name(&self) -> Option<&str> {
        if !self.is("tool_use") {
            return None;
        }
        self.name.as_deref()
    }

    /// String value of a key inside a tool input object
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.as_ref()?.get(key)?.as_str()
    }
}

/// Message content: either plain text or a list of typed blocks
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Blocks of an array-shaped content, empty for plain text
    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            Self::Text(_) => &[],
            Self::Blocks(blocks) => blocks,
        }
    }
}

/// Message payload of a user or assistant record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<RawUsage>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<MessageContent>,
}

/// One line of a session log
///
/// Every field is optional and decoded leniently. Unknown fields are ignored.
///
/// # Examples
/// ```
/// use ccsessions_core::types::RawRecord;
///
/// let line = r#"{"type":"assistant","timestamp":"2024-01-01T00:00:00Z","message":{"model":"claude-sonnet-4-5","usage":{"input_tokens":"oops","output_tokens":7}}}"#;
/// let record: RawRecord = serde_json::from_str(line).unwrap();
/// let usage = record.message.unwrap().usage.unwrap();
/// assert_eq!(usage.input_tokens, None);
/// assert_eq!(usage.output_tokens, Some(7));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Record kind: "user", "assistant", "system", or anything newer
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cwd: Option<String>,
    #[serde(rename = "gitBranch", default, deserialize_with = "lenient")]
    pub git_branch: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<RawMessage>,
    /// Turn duration reported on `system`/`turn_duration` records
    #[serde(rename = "durationMs", default, deserialize_with = "lenient")]
    pub duration_ms: Option<u64>,
}

/// Summary record built from one session log file
///
/// Built once by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// File base name without extension
    pub id: SessionId,
    /// First timestamp seen in the file
    pub timestamp: ISOTimestamp,
    /// Inferred project label
    pub project: String,
    /// Working directory, `~` when the log never reported one
    pub cwd: String,
    pub title: String,
    pub summary: String,
    pub size_bytes: u64,
    pub user_messages: u64,
    pub assistant_messages: u64,
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Tool name to call count
    pub tool_counts: HashMap<String, u64>,
    pub model: ModelName,
    /// Sum of reported turn durations in milliseconds
    pub duration_ms: u64,
    pub git_branch: String,
    /// Estimated cost in USD, unrounded
    pub estimated_cost: f64,
}

impl Session {
    /// Sum of all four token counters
    pub fn total_tokens(&self) -> u64 {
        self.tokens.total()
    }

    /// Tools ordered by call count, most used first
    pub fn top_tools(&self) -> Vec<(&str, u64)> {
        let mut tools: Vec<(&str, u64)> = self
            .tool_counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        tools.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tools
    }

    /// Summary text after the first message, empty for single-message sessions
    pub fn preview(&self) -> &str {
        self.summary
            .split_once(SUMMARY_SEPARATOR)
            .map(|(_, rest)| rest)
            .unwrap_or("")
    }

    /// Shell command that resumes this session
    pub fn resume_command(&self) -> String {
        format!("claude --resume {}", self.id)
    }
}

/// Separator between message snippets in a session summary
pub const SUMMARY_SEPARATOR: &str = " → ";
