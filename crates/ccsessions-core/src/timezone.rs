//! Timezone utilities for date handling
//!
//! Calendar questions such as "is this session from today" or "which day does it
//! belong to" depend on the zone they are asked in. This module detects the local
//! timezone, parses one from user input, and answers those questions.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use crate::error::{CcsessionsError, Result};
use crate::types::{DailyDate, ISOTimestamp};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Zone used for every calendar computation
#[derive(Debug, Clone)]
pub struct TimezoneConfig {
    pub tz: Tz,
    /// Cached `tz == UTC`
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    /// The local zone, see [`local_timezone`]
    fn default() -> Self {
        Self::new(local_timezone())
    }
}

impl TimezoneConfig {
    pub fn new(tz: Tz) -> Self {
        Self {
            is_utc: tz == Tz::UTC,
            tz,
        }
    }

    /// Build from the `--timezone` and `--utc` flags
    ///
    /// `--utc` wins over an explicit zone; with neither, the local zone is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use ccsessions_core::timezone::TimezoneConfig;
    ///
    /// let tokyo = TimezoneConfig::from_cli(Some("Asia/Tokyo"), false).unwrap();
    /// assert_eq!(tokyo.display_name(), "Asia/Tokyo");
    /// assert!(TimezoneConfig::from_cli(Some("Mars/Olympus"), false).is_err());
    /// ```
    pub fn from_cli(name: Option<&str>, use_utc: bool) -> Result<Self> {
        match (use_utc, name) {
            (true, _) => Ok(Self::new(Tz::UTC)),
            (false, Some(name)) => Tz::from_str(name).map(Self::new).map_err(|_| {
                CcsessionsError::InvalidTimezone(format!(
                    "'{name}'. Expected an IANA name such as 'Europe/Paris' or 'UTC'"
                ))
            }),
            (false, None) => Ok(Self::default()),
        }
    }

    /// IANA name of the zone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Calendar date of a timestamp in this zone
    pub fn date_of(&self, ts: &ISOTimestamp) -> DailyDate {
        ts.to_daily_date_with_tz(&self.tz)
    }

    /// Calendar date of `now` in this zone
    pub fn today(&self, now: DateTime<Utc>) -> DailyDate {
        DailyDate::new(now.with_timezone(&self.tz).date_naive())
    }

    /// True when `ts` falls on the same calendar day as `now`
    pub fn is_same_day(&self, ts: &ISOTimestamp, now: DateTime<Utc>) -> bool {
        self.date_of(ts) == self.today(now)
    }

    /// True when `ts` falls in the same ISO week (Monday start) as `now`
    pub fn is_same_week(&self, ts: &ISOTimestamp, now: DateTime<Utc>) -> bool {
        self.date_of(ts).inner().iso_week() == self.today(now).inner().iso_week()
    }
}

fn parse_zone(source: &str, name: &str) -> Option<Tz> {
    match Tz::from_str(name) {
        Ok(tz) => {
            debug!("Using timezone {} from {}", name, source);
            Some(tz)
        }
        Err(_) => {
            debug!("Ignoring unknown timezone '{}' from {}", name, source);
            None
        }
    }
}

/// Local timezone of the machine
///
/// `TZ` is consulted first, then the system setting. Anything unparseable
/// falls through to UTC.
pub fn local_timezone() -> Tz {
    let from_env = env::var("TZ")
        .ok()
        .filter(|name| !name.is_empty())
        .and_then(|name| parse_zone("TZ", &name));
    if let Some(tz) = from_env {
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => parse_zone("the system", &name).unwrap_or(Tz::UTC),
        Err(e) => {
            debug!("No system timezone ({:?}), using UTC", e);
            Tz::UTC
        }
    }
}
