//! Time-step granularity of a time series and the grid math derived from it.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The temporal resolution of observation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One observation per hour.
    Hourly,
    /// One observation per day, indexed at midnight.
    Daily,
}

impl Granularity {
    /// The canonical step between two adjacent grid timestamps.
    pub fn step(&self) -> Duration {
        match self {
            Granularity::Hourly => Duration::hours(1),
            Granularity::Daily => Duration::days(1),
        }
    }

    /// Number of grid timestamps between `start` and `end`, both inclusive.
    ///
    /// Partial trailing units are floored, so an hourly range ending at
    /// 23:59:59 counts the 23:00 slot but not a 24th hour.
    pub fn rows_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> usize {
        if end < start {
            return 0;
        }
        let diff = end - start;
        let units = match self {
            Granularity::Hourly => diff.num_hours(),
            Granularity::Daily => diff.num_days(),
        };
        units as usize + 1
    }

    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
