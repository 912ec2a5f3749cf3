//! Session store
//!
//! The store owns the published session collection and the views derived from
//! it. Scans run in the background: [`SessionStore::request_scan`] hands the
//! whole discover-and-parse job to the blocking thread pool and returns at once.
//! The finished collection comes back over a channel and is published by the
//! store's owner in [`SessionStore::apply`], replacing the previous collection
//! in one step. Until then readers keep seeing the previous collection.
//!
//! Every request is tagged with a generation number. A completion older than
//! the newest one already published is discarded, so an overlapping slow scan
//! can never overwrite the result of a newer one.
//!
//! # Examples
//!
//! ```no_run
//! use ccsessions::store::SessionStore;
//! use ccsessions::filters::SessionFilter;
//! use ccsessions_core::timezone::TimezoneConfig;
//! use ccsessions_provider_claude::DataLoader;
//! use std::time::Duration;
//!
//! # async fn example() -> ccsessions::Result<()> {
//! let loader = DataLoader::discover(None)?;
//! let mut store = SessionStore::new(loader, TimezoneConfig::default(), Duration::ZERO);
//!
//! store.request_scan();
//! store.wait_until_loaded().await;
//!
//! let now = chrono::Utc::now();
//! for session in store.filtered(&SessionFilter::new(), now) {
//!     println!("{} {}", session.project, session.title);
//! }
//! # Ok(())
//! # }
//! ```

use crate::filters::{DayGroup, SessionFilter, group_by_day, is_large};
use ccsessions_core::error::{CcsessionsError, Result};
use ccsessions_core::timezone::TimezoneConfig;
use ccsessions_core::types::Session;
use ccsessions_provider_claude::DataLoader;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Result of one background scan
#[derive(Debug)]
pub struct ScanCompletion {
    /// Generation of the request that produced this result
    pub generation: u64,
    /// The scanned sessions, or the reason the scan task died
    pub result: Result<Vec<Session>>,
}

/// Counts and totals over the session collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub sessions: usize,
    pub projects: usize,
    pub today: usize,
    pub this_week: usize,
    pub large: usize,
    /// Bytes of log data in the filtered view
    pub total_size: u64,
    /// User messages in the filtered view
    pub total_messages: u64,
    /// Estimated cost of the filtered view
    pub total_cost: f64,
}

/// Owner of the published session collection
pub struct SessionStore {
    loader: Arc<DataLoader>,
    tz: TimezoneConfig,
    window: Duration,
    sessions: Arc<Vec<Session>>,
    requested: u64,
    settled: u64,
    completions_tx: mpsc::UnboundedSender<ScanCompletion>,
    completions_rx: mpsc::UnboundedReceiver<ScanCompletion>,
}

impl SessionStore {
    /// Create an empty store
    ///
    /// `window` is the recency window used for scans; zero means unbounded.
    pub fn new(loader: DataLoader, tz: TimezoneConfig, window: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            loader: Arc::new(loader),
            tz,
            window,
            sessions: Arc::new(Vec::new()),
            requested: 0,
            settled: 0,
            completions_tx,
            completions_rx,
        }
    }

    /// Timezone used for calendar views
    pub fn timezone(&self) -> &TimezoneConfig {
        &self.tz
    }

    /// Recency window used for scans
    pub fn window(&self) -> Duration {
        self.window
    }

    /// True while the newest requested scan has not completed
    pub fn is_loading(&self) -> bool {
        self.requested > self.settled
    }

    /// Snapshot of the published collection, newest first
    pub fn sessions(&self) -> Arc<Vec<Session>> {
        Arc::clone(&self.sessions)
    }

    /// Start a background scan and return its generation
    ///
    /// Must be called from within a tokio runtime. Requests are neither
    /// deduplicated nor cancelled.
    pub fn request_scan(&mut self) -> u64 {
        self.requested += 1;
        let generation = self.requested;
        let loader = Arc::clone(&self.loader);
        let window = self.window;
        let tx = self.completions_tx.clone();

        debug!("Requesting scan generation {}", generation);
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || loader.load_sessions(window))
                .await
                .map_err(|e| CcsessionsError::Task(e.to_string()));
            // The store may have been dropped; nobody is left to publish to
            let _ = tx.send(ScanCompletion { generation, result });
        });

        generation
    }

    /// Rescan with the current window
    pub fn rescan(&mut self) -> u64 {
        self.request_scan()
    }

    /// Clear the recency window and rescan everything
    pub fn scan_all(&mut self) -> u64 {
        self.window = Duration::ZERO;
        self.request_scan()
    }

    /// Publish a finished scan
    ///
    /// Returns `true` when the completion replaced the collection. Stale
    /// completions and failed scans leave the collection untouched.
    pub fn apply(&mut self, completion: ScanCompletion) -> bool {
        let ScanCompletion { generation, result } = completion;
        if generation <= self.settled {
            warn!(
                "Discarding scan generation {} (generation {} already published)",
                generation, self.settled
            );
            return false;
        }
        self.settled = generation;

        match result {
            Ok(sessions) => {
                info!(
                    "Published {} sessions from scan generation {}",
                    sessions.len(),
                    generation
                );
                self.sessions = Arc::new(sessions);
                true
            }
            Err(e) => {
                warn!("Scan generation {} failed: {}", generation, e);
                false
            }
        }
    }

    /// Wait for the next completion and publish it
    pub async fn next_completion(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => self.apply(completion),
            None => false,
        }
    }

    /// Wait until the newest requested scan has completed
    pub async fn wait_until_loaded(&mut self) {
        while self.is_loading() {
            self.next_completion().await;
        }
    }

    /// Sessions passing `filter`, newest first
    pub fn filtered(&self, filter: &SessionFilter, now: DateTime<Utc>) -> Vec<&Session> {
        self.sessions
            .iter()
            .filter(|session| filter.matches(session, &self.tz, now))
            .collect()
    }

    /// Sessions passing `filter`, grouped by day
    pub fn grouped_by_day(&self, filter: &SessionFilter, now: DateTime<Utc>) -> Vec<DayGroup<'_>> {
        group_by_day(self.filtered(filter, now), &self.tz)
    }

    /// Distinct project labels, sorted
    pub fn projects(&self) -> Vec<&str> {
        self.sessions
            .iter()
            .map(|session| session.project.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of sessions attributed to `project`
    pub fn session_count(&self, project: &str) -> usize {
        self.sessions
            .iter()
            .filter(|session| session.project == project)
            .count()
    }

    /// Number of sessions started today
    pub fn today_count(&self, now: DateTime<Utc>) -> usize {
        self.sessions
            .iter()
            .filter(|session| self.tz.is_same_day(&session.timestamp, now))
            .count()
    }

    /// Number of sessions started this ISO week
    pub fn this_week_count(&self, now: DateTime<Utc>) -> usize {
        self.sessions
            .iter()
            .filter(|session| self.tz.is_same_week(&session.timestamp, now))
            .count()
    }

    /// Number of large sessions
    pub fn large_session_count(&self) -> usize {
        self.sessions.iter().filter(|session| is_large(session)).count()
    }

    /// Bytes of log data behind the filtered view
    pub fn total_size(&self, filter: &SessionFilter, now: DateTime<Utc>) -> u64 {
        self.filtered(filter, now)
            .iter()
            .map(|session| session.size_bytes)
            .sum()
    }

    /// User messages in the filtered view
    pub fn total_messages(&self, filter: &SessionFilter, now: DateTime<Utc>) -> u64 {
        self.filtered(filter, now)
            .iter()
            .map(|session| session.user_messages)
            .sum()
    }

    /// Look up a session by id
    pub fn find(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id.as_str() == id)
    }

    /// Look up a session by id, failing when it is unknown
    pub fn get(&self, id: &str) -> Result<&Session> {
        self.find(id)
            .ok_or_else(|| CcsessionsError::SessionNotFound(id.to_string()))
    }

    /// Collection statistics, with totals over the filtered view
    pub fn stats(&self, filter: &SessionFilter, now: DateTime<Utc>) -> StoreStats {
        StoreStats {
            sessions: self.sessions.len(),
            projects: self.projects().len(),
            today: self.today_count(now),
            this_week: self.this_week_count(now),
            large: self.large_session_count(),
            total_size: self.total_size(filter, now),
            total_messages: self.total_messages(filter, now),
            total_cost: self
                .filtered(filter, now)
                .iter()
                .map(|session| session.estimated_cost)
                .sum(),
        }
    }
}
