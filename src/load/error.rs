use crate::types::granularity::Granularity;
use crate::types::provider::ProviderId;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidTimeRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("no stations requested")]
    NoStations,

    #[error("provider {provider} does not serve {granularity} data")]
    UnsupportedProvider {
        provider: ProviderId,
        granularity: Granularity,
    },
}
