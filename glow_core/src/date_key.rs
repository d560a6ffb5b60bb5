//! Calendar-day identifiers.
//!
//! A [`DateKey`] names one local calendar day as `YYYY-MM-DD`. Keys order the
//! same way their string forms do, so they can be used directly as sorted map
//! keys and file names.

use crate::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Identifier of a single local calendar day
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Key for the calendar day `instant` falls on in its own time zone
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        DateKey(instant.date_naive())
    }

    /// Parse a strict `YYYY-MM-DD` key
    pub fn parse(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(s, KEY_FORMAT)
            .map_err(|e| Error::InvalidArgument(format!("Invalid date key {:?}: {}", s, e)))?;
        let key = DateKey(date);

        // chrono accepts unpadded fields; only the canonical form is a key
        if key.to_string() != s {
            return Err(Error::InvalidArgument(format!(
                "Invalid date key {:?}: expected YYYY-MM-DD",
                s
            )));
        }
        Ok(key)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day
    pub fn pred(&self) -> Option<Self> {
        self.days_back(1)
    }

    /// The next calendar day
    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(DateKey)
    }

    /// The calendar day `n` days before this one
    pub fn days_back(&self, n: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(n)).map(DateKey)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl std::str::FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DateKey::parse(s)
    }
}
