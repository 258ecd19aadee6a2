pub mod error;
pub mod merge;
#[allow(clippy::module_inception)]
pub mod timeseries;
