//! The static registry of upstream data providers.
//!
//! Each provider is described by an immutable [`ProviderSpec`]: what it
//! serves, at which granularity, from when, and at which merge priority.
//! The priority ranks induce a total order which is the sole tie-break when
//! overlapping observations are merged.

use crate::types::granularity::Granularity;
use crate::types::parameter::Parameter;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Merge priority of a provider. Lower ranks win ties, so `Highest`
/// beats everything else for any overlapping cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
}

/// Identifier of a configured upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    /// Meteostat bulk hourly mirror (pre-aggregated station files).
    MeteostatHourly,
    /// Meteostat bulk daily mirror.
    MeteostatDaily,
    /// Meteostat SYNOP mirror, one CSV per station and year.
    MeteostatSynop,
    /// NOAA ISD Lite, one fixed-width file per station and year.
    NoaaIsdLite,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderId::MeteostatHourly => "meteostat-hourly",
            ProviderId::MeteostatDaily => "meteostat-daily",
            ProviderId::MeteostatSynop => "meteostat-synop",
            ProviderId::NoaaIsdLite => "noaa-isd-lite",
        };
        write!(f, "{s}")
    }
}

/// Immutable description of a provider.
///
/// A provider never contributes data outside its declared parameter set or
/// before its `start` date; the orchestrator filters on both.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    pub id: ProviderId,
    pub name: &'static str,
    pub granularity: Granularity,
    pub priority: Priority,
    pub parameters: &'static [Parameter],
    pub start: NaiveDateTime,
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid provider start date")
        .and_hms_opt(hour, 0, 0)
        .expect("valid provider start time")
}

/// Returns the spec for a provider.
pub fn provider_spec(id: ProviderId) -> ProviderSpec {
    match id {
        ProviderId::MeteostatHourly => ProviderSpec {
            id,
            name: "Meteostat Hourly",
            granularity: Granularity::Hourly,
            priority: Priority::Highest,
            parameters: &[
                Parameter::Temp,
                Parameter::Dwpt,
                Parameter::Rhum,
                Parameter::Prcp,
                Parameter::Snow,
                Parameter::Wdir,
                Parameter::Wspd,
                Parameter::Wpgt,
                Parameter::Pres,
                Parameter::Tsun,
                Parameter::Coco,
            ],
            start: at(1931, 1, 1, 0),
        },
        ProviderId::MeteostatDaily => ProviderSpec {
            id,
            name: "Meteostat Daily",
            granularity: Granularity::Daily,
            priority: Priority::Highest,
            parameters: &[
                Parameter::Tavg,
                Parameter::Tmin,
                Parameter::Tmax,
                Parameter::Prcp,
                Parameter::Snow,
                Parameter::Wdir,
                Parameter::Wspd,
                Parameter::Wpgt,
                Parameter::Pres,
                Parameter::Tsun,
            ],
            start: at(1781, 1, 1, 0),
        },
        ProviderId::MeteostatSynop => ProviderSpec {
            id,
            name: "Meteostat SYNOP",
            granularity: Granularity::Hourly,
            priority: Priority::Medium,
            parameters: &[
                Parameter::Temp,
                Parameter::Rhum,
                Parameter::Prcp,
                Parameter::Snow,
                Parameter::Wdir,
                Parameter::Wspd,
                Parameter::Wpgt,
                Parameter::Pres,
                Parameter::Tsun,
                Parameter::Cldc,
                Parameter::Coco,
            ],
            // first hour the SYNOP mirror publishes
            start: at(2015, 8, 7, 17),
        },
        ProviderId::NoaaIsdLite => ProviderSpec {
            id,
            name: "NOAA ISD Lite",
            granularity: Granularity::Hourly,
            priority: Priority::High,
            parameters: &[
                Parameter::Temp,
                Parameter::Rhum,
                Parameter::Prcp,
                Parameter::Wdir,
                Parameter::Wspd,
                Parameter::Pres,
                Parameter::Cldc,
            ],
            start: at(1931, 1, 1, 0),
        },
    }
}
