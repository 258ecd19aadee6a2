use crate::load::error::LoadError;
use crate::timeseries::error::TimeSeriesError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteofuseError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    TimeSeries(#[from] TimeSeriesError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
