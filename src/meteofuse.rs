//! The main entry point for loading aggregated weather time series.
//!
//! A [`Meteofuse`] client owns the fetch cache, the station metadata
//! lookup and the set of provider adapters. Requests are issued through
//! the granularity clients returned by [`Meteofuse::hourly`] and
//! [`Meteofuse::daily`].

use crate::clients::daily_client::DailyClient;
use crate::clients::hourly_client::HourlyClient;
use crate::error::MeteofuseError;
use crate::load::cache::FetchCache;
use crate::load::loader::load_timeseries;
use crate::providers::{AdapterRegistry, ProviderAdapter};
use crate::stations::meta::StationLookup;
use crate::table::observation::ObservationTable;
use crate::timeseries::timeseries::TimeSeries;
use crate::types::provider::ProviderId;
use crate::types::query::Query;
use crate::types::station::Station;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use log::warn;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

/// Client for loading weather observations merged across providers.
///
/// # Examples
///
/// ```no_run
/// # use meteofuse::{Meteofuse, MeteofuseError};
/// # use chrono::NaiveDate;
/// # async fn run() -> Result<(), MeteofuseError> {
/// let client = Meteofuse::new().await?;
/// let series = client
///     .daily()
///     .station("10637")
///     .start(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
///     .end(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap())
///     .call()
///     .await?;
/// println!("completeness: {}", series.completeness(None));
/// # Ok(())
/// # }
/// ```
pub struct Meteofuse {
    pub(crate) data_cache: FetchCache<Option<ObservationTable>>,
    pub(crate) stations: StationLookup,
    pub(crate) adapters: AdapterRegistry,
}

impl Meteofuse {
    /// Creates a client with a specific cache directory, creating the
    /// directory if needed.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, MeteofuseError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| MeteofuseError::CacheDirCreation(cache_folder.clone(), e))?;
        let http = Client::new();
        Ok(Meteofuse {
            data_cache: FetchCache::new(&cache_folder),
            stations: StationLookup::new(&cache_folder, http.clone()),
            adapters: AdapterRegistry::defaults(http),
        })
    }

    /// Creates a client using the default cache directory resolved through
    /// the `dirs` crate.
    pub async fn new() -> Result<Self, MeteofuseError> {
        let cache_folder = get_cache_dir().map_err(MeteofuseError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Replaces the whole adapter set. Useful for tests and for running
    /// against self-hosted mirrors.
    pub fn with_adapter_registry(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    /// Registers (or replaces) a single provider adapter.
    pub fn register_adapter(&mut self, id: ProviderId, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.register(id, adapter);
    }

    /// Starts an hourly data request.
    pub fn hourly(&self) -> HourlyClient<'_> {
        HourlyClient::new(self)
    }

    /// Starts a daily data request.
    pub fn daily(&self) -> DailyClient<'_> {
        DailyClient::new(self)
    }

    /// Resolves station metadata and runs the orchestrator for a validated
    /// query. Stations without metadata degrade to id-only records.
    pub(crate) async fn load(&self, query: Query) -> Result<TimeSeries, MeteofuseError> {
        query.validate()?;
        let mut records = Vec::with_capacity(query.stations.len());
        for id in &query.stations {
            match self.stations.lookup(id).await {
                Some(station) => records.push(station),
                None => {
                    warn!("no metadata found for station {id}; continuing with id only");
                    records.push(Station::minimal(id));
                }
            }
        }
        Ok(load_timeseries(&query, &records, &self.data_cache, &self.adapters).await)
    }
}
