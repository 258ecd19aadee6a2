mod clients;
mod error;
mod load;
mod meteofuse;
mod providers;
mod stations;
mod table;
mod timeseries;
mod types;
mod utils;

pub use error::MeteofuseError;
pub use meteofuse::Meteofuse;

pub use clients::daily_client::*;
pub use clients::hourly_client::*;

pub use types::granularity::Granularity;
pub use types::parameter::Parameter;
pub use types::provider::{provider_spec, Priority, ProviderId, ProviderSpec};
pub use types::query::Query;
pub use types::station::{Identifiers, Location, Station};

pub use table::observation::{Observation, ObservationTable};
pub use timeseries::merge::merge_tables;
pub use timeseries::timeseries::TimeSeries;

pub use load::cache::FetchCache;
pub use load::error::LoadError;
pub use load::loader::FETCH_TTL;
pub use timeseries::error::TimeSeriesError;

pub use providers::{AdapterRegistry, ProviderAdapter, ProviderError};
pub use stations::meta::StationLookup;
