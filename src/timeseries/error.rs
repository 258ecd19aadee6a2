use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeSeriesError {
    #[error("can't concatenate time series with divergent granularity, start, end or timezone")]
    MergeMismatch,

    #[error("duplicate observation index for station '{station}' at {time} after concatenation")]
    IndexCollision {
        station: String,
        time: NaiveDateTime,
    },
}
