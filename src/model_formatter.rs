//! Model name formatting for display
//!
//! Model identifiers such as `claude-opus-4-6` or `claude-3-5-haiku-20241022`
//! are too long for a session table. This module reduces them to the model
//! family plus its version.

use ccsessions_core::types::ModelName;

/// Shown when a session never reported a model
pub const NO_MODEL: &str = "—";

/// Short display name for a model identifier
///
/// - `claude-opus-4-6` → `Opus 4.6`
/// - `claude-sonnet-4-20250514` → `Sonnet 4`
/// - `claude-3.5-sonnet` → `Sonnet 3.5`
/// - `claude-haiku` → `Haiku`
///
/// An empty identifier becomes `—`. An identifier without a known family is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use ccsessions::model_formatter::short_model_name;
///
/// assert_eq!(short_model_name("claude-opus-4-6"), "Opus 4.6");
/// assert_eq!(short_model_name("claude-3-5-haiku-20241022"), "Haiku 3.5");
/// assert_eq!(short_model_name(""), "—");
/// assert_eq!(short_model_name("gpt-4"), "gpt-4");
/// ```
pub fn short_model_name(model: &str) -> String {
    if model.is_empty() {
        return NO_MODEL.to_string();
    }

    let lower = model.to_lowercase();
    let family = ["opus", "sonnet", "haiku"]
        .into_iter()
        .find(|family| lower.contains(family));

    let family = match family {
        Some("opus") => "Opus",
        Some("sonnet") => "Sonnet",
        Some("haiku") => "Haiku",
        _ => return model.to_string(),
    };

    match extract_version(&lower) {
        Some(version) => format!("{family} {version}"),
        None => family.to_string(),
    }
}

/// Short display name for a [`ModelName`]
pub fn format_model(model: &ModelName) -> String {
    short_model_name(model.as_str())
}

/// An 8-digit release date suffix such as `20250514`
fn is_release_date(part: &str) -> bool {
    part.len() == 8 && part.bytes().all(|b| b.is_ascii_digit())
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Find the version inside a dash-separated model identifier
///
/// The first numeric component is the major version. A dotted component such
/// as `3.5` is taken whole. A numeric component directly after the major
/// version is the minor version unless it is a release date.
fn extract_version(model: &str) -> Option<String> {
    let parts: Vec<&str> = model.split('-').collect();

    for (index, part) in parts.iter().enumerate() {
        if let Some((major, minor)) = part.split_once('.') {
            if is_number(major) && is_number(minor) {
                return Some(part.to_string());
            }
            continue;
        }

        if is_release_date(part) || !is_number(part) {
            continue;
        }

        return match parts.get(index + 1) {
            Some(next) if is_number(next) && !is_release_date(next) => {
                Some(format!("{part}.{next}"))
            }
            _ => Some(part.to_string()),
        };
    }

    None
}
