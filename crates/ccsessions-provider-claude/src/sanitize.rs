//! Text cleanup for user messages
//!
//! User messages carry injected `<system-reminder>` blocks and other markup that
//! make poor titles. This module strips them and derives the short title and the
//! multi-message summary shown for a session.
//!
//! # Examples
//!
//! ```
//! use ccsessions_provider_claude::sanitize::{sanitize, title_from, summary_from};
//!
//! let raw = "<system-reminder>be nice</system-reminder>\n<b>Fix</b> the build";
//! assert_eq!(sanitize(raw), "Fix the build");
//!
//! let messages = vec!["# Release prep\nbump versions".to_string(), "ok".to_string()];
//! assert_eq!(title_from(&messages), "Release prep");
//! assert_eq!(summary_from(&messages), "# Release prep\nbump versions → ok");
//! ```

use ccsessions_core::types::SUMMARY_SEPARATOR;
use once_cell::sync::Lazy;
use regex::Regex;

static SYSTEM_REMINDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<system-reminder>.*?</system-reminder>").expect("valid reminder pattern")
});

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid markup tag pattern"));

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,3} ").expect("valid heading pattern"));

const HEADING_TITLE_CHARS: usize = 80;
const TITLE_CHARS: usize = 60;
const SUMMARY_MESSAGE_CHARS: usize = 120;
const SUMMARY_MESSAGES: usize = 3;

/// Title used when the first message has no usable text
pub const UNTITLED: &str = "Untitled";

/// Summary used when no message has usable text
pub const EMPTY_SUMMARY: &str = "—";

/// Remove every match of `pattern` until none is left
fn strip_all(text: &str, pattern: &Regex) -> String {
    let mut current = text.to_string();
    while pattern.is_match(&current) {
        current = pattern.replace_all(&current, "").into_owned();
    }
    current
}

/// Strip reminder blocks and markup tags, then trim
pub fn sanitize(text: &str) -> String {
    let without_reminders = strip_all(text, &SYSTEM_REMINDER);
    strip_all(&without_reminders, &MARKUP_TAG).trim().to_string()
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// First markdown heading (levels 1 to 3) with non-empty text
fn first_heading(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| HEADING.is_match(line))
        .map(|line| line.trim_start_matches('#').trim())
        .find(|heading| !heading.is_empty())
}

/// Session title from the collected user messages
///
/// A heading in the first message wins over its opening characters.
pub fn title_from(messages: &[String]) -> String {
    let Some(first) = messages.first() else {
        return UNTITLED.to_string();
    };

    let cleaned = sanitize(first);
    let title = match first_heading(&cleaned) {
        Some(heading) => truncate(heading, HEADING_TITLE_CHARS),
        None => truncate(&cleaned, TITLE_CHARS),
    };

    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Session summary from the first few user messages
pub fn summary_from(messages: &[String]) -> String {
    let parts: Vec<String> = messages
        .iter()
        .take(SUMMARY_MESSAGES)
        .map(|message| sanitize(message))
        .filter(|cleaned| !cleaned.is_empty())
        .map(|cleaned| truncate(&cleaned, SUMMARY_MESSAGE_CHARS))
        .collect();

    if parts.is_empty() {
        EMPTY_SUMMARY.to_string()
    } else {
        parts.join(SUMMARY_SEPARATOR)
    }
}
