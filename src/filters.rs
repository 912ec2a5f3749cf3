//! Filtering and grouping of sessions
//!
//! A view of the session collection combines a free-text search with one
//! exclusive collection (everything, today, this week, large sessions, or one
//! project). Calendar collections are evaluated in the configured timezone.
//!
//! # Examples
//!
//! ```
//! use ccsessions::filters::{Collection, SessionFilter};
//!
//! let filter = SessionFilter::new()
//!     .with_search("migration")
//!     .with_collection(Collection::Project("atlas".to_string()));
//! assert_eq!(filter.search.as_deref(), Some("migration"));
//! ```

use ccsessions_core::timezone::TimezoneConfig;
use ccsessions_core::types::{DailyDate, Session};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sessions above this many total tokens count as large
pub const LARGE_SESSION_TOKENS: u64 = 100_000;

/// Exclusive subset of the session collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Collection {
    /// Every session
    #[default]
    All,
    /// Sessions started on the current calendar day
    Today,
    /// Sessions started in the current ISO week
    ThisWeek,
    /// Sessions with more than [`LARGE_SESSION_TOKENS`] tokens
    LargeSessions,
    /// Sessions attributed to one project
    Project(String),
}

impl Collection {
    /// Check whether a session belongs to this collection
    pub fn contains(&self, session: &Session, tz: &TimezoneConfig, now: DateTime<Utc>) -> bool {
        match self {
            Collection::All => true,
            Collection::Today => tz.is_same_day(&session.timestamp, now),
            Collection::ThisWeek => tz.is_same_week(&session.timestamp, now),
            Collection::LargeSessions => is_large(session),
            Collection::Project(project) => session.project == *project,
        }
    }
}

/// True when a session exceeds [`LARGE_SESSION_TOKENS`]
pub fn is_large(session: &Session) -> bool {
    session.total_tokens() > LARGE_SESSION_TOKENS
}

/// Search text and collection applied together
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    /// Case-insensitive text matched against title, summary and project
    pub search: Option<String>,
    /// Collection the session must belong to
    pub collection: Collection,
}

impl SessionFilter {
    /// Create a filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text; blank text matches everything
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    /// Set the collection
    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collection = collection;
        self
    }

    /// Check if a session passes both the search and the collection
    pub fn matches(&self, session: &Session, tz: &TimezoneConfig, now: DateTime<Utc>) -> bool {
        let search_matches = match &self.search {
            Some(search) => matches_search(session, search),
            None => true,
        };
        search_matches && self.collection.contains(session, tz, now)
    }
}

/// Case-insensitive substring match on title, summary and project
pub fn matches_search(session: &Session, query: &str) -> bool {
    let query = query.to_lowercase();
    [&session.title, &session.summary, &session.project]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Sessions that started on one calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup<'a> {
    pub date: DailyDate,
    pub sessions: Vec<&'a Session>,
}

/// Bucket sessions by calendar day
///
/// Days are ordered newest first, and so are the sessions within each day.
pub fn group_by_day<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    tz: &TimezoneConfig,
) -> Vec<DayGroup<'a>> {
    let mut days: BTreeMap<DailyDate, Vec<&'a Session>> = BTreeMap::new();
    for session in sessions {
        days.entry(tz.date_of(&session.timestamp))
            .or_default()
            .push(session);
    }

    days.into_iter()
        .rev()
        .map(|(date, mut sessions)| {
            sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            DayGroup { date, sessions }
        })
        .collect()
}
