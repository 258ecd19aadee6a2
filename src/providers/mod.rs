//! Provider adapters: thin format shims between upstream publications and
//! the normalized [`ObservationTable`].
//!
//! The contract is deliberately narrow: given a station and a calendar
//! year, return a normalized table or nothing. "Not found" and transport
//! or parse failures are distinguished in the logs, but both reduce to
//! `None` so a broken chunk only leaves a gap for a lower-priority
//! provider to fill.

pub mod converters;
pub mod download;
pub mod error;
pub mod meteostat;
pub mod noaa;

use crate::table::observation::ObservationTable;
use crate::types::provider::ProviderId;
use crate::types::station::Station;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

pub use error::ProviderError;

/// A single upstream data source, normalized behind one fetch operation.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The identifier tuple this adapter fetches by, used in cache keys.
    /// `None` means the station lacks the identifiers this provider needs
    /// and the fetch is skipped entirely.
    fn cache_token(&self, station: &Station) -> Option<String> {
        Some(station.id.clone())
    }

    /// Fetches one calendar year of observations for a station.
    ///
    /// Returns `None` on any failure; implementations log the cause.
    async fn fetch_year(&self, station: &Station, year: i32) -> Option<ObservationTable>;
}

/// The set of adapters available to the orchestrator, keyed by provider id.
pub struct AdapterRegistry {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// An empty registry; useful for tests that register mocks.
    pub fn empty() -> Self {
        AdapterRegistry {
            adapters: HashMap::new(),
        }
    }

    /// The default adapter set, one per registered provider, sharing one
    /// HTTP client.
    pub fn defaults(http: Client) -> Self {
        let mut registry = Self::empty();
        registry.register(
            ProviderId::MeteostatHourly,
            Arc::new(meteostat::bulk::MeteostatBulk::hourly(http.clone())),
        );
        registry.register(
            ProviderId::MeteostatDaily,
            Arc::new(meteostat::bulk::MeteostatBulk::daily(http.clone())),
        );
        registry.register(
            ProviderId::MeteostatSynop,
            Arc::new(meteostat::synop::MeteostatSynop::new(http.clone())),
        );
        registry.register(
            ProviderId::NoaaIsdLite,
            Arc::new(noaa::isd_lite::NoaaIsdLite::new(http)),
        );
        registry
    }

    pub fn register(&mut self, id: ProviderId, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(id, adapter);
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&id).cloned()
    }
}
