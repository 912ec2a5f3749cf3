//! Live monitoring for the session list
//!
//! The monitor requests a rescan on every tick and redraws the list whenever a
//! scan is published. Ticks never wait for the previous scan; overlapping
//! scans are sorted out by the store's generation check.

use crate::filters::SessionFilter;
use crate::output::{DisplayContext, OutputFormatter};
use crate::store::SessionStore;
use chrono::Utc;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

/// Periodic rescans of a [`SessionStore`]
pub struct LiveMonitor {
    store: SessionStore,
    filter: SessionFilter,
    formatter: Box<dyn OutputFormatter>,
    home: String,
    interval_secs: u64,
}

impl LiveMonitor {
    pub fn new(
        store: SessionStore,
        filter: SessionFilter,
        formatter: Box<dyn OutputFormatter>,
        home: impl Into<String>,
        interval_secs: u64,
    ) -> Self {
        Self {
            store,
            filter,
            formatter,
            home: home.into(),
            interval_secs,
        }
    }

    /// Run until Ctrl+C
    pub async fn run(&mut self) -> crate::Result<()> {
        let mut ticker = interval(Duration::from_secs(self.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Whatever was loaded before the monitor started
        self.refresh_display()?;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let generation = self.store.rescan();
                    debug!("Watch tick requested scan generation {}", generation);
                }
                changed = self.store.next_completion() => {
                    if changed {
                        self.refresh_display()?;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\nExiting live monitoring mode...");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Render the current view without touching the terminal
    pub fn render(&self) -> crate::Result<String> {
        let now = Utc::now();
        let ctx = DisplayContext::new(self.store.timezone().clone(), self.home.clone(), now);
        let sessions = self.store.filtered(&self.filter, now);
        self.formatter.format_sessions(&sessions, &ctx)
    }

    fn refresh_display(&self) -> crate::Result<()> {
        let output = self.render()?;

        // Clear screen and move cursor to top
        print!("\x1B[2J\x1B[1;1H");
        println!(
            "{} (every {}s, updated {}). Press Ctrl+C to exit.\n",
            "ccsessions watch".bold(),
            self.interval_secs,
            Utc::now()
                .with_timezone(&self.store.timezone().tz)
                .format("%H:%M:%S")
        );
        print!("{output}");
        std::io::stdout().flush()?;
        Ok(())
    }
}
