//! Station metadata lookup against the Meteostat station mirrors.
//!
//! Mirrors are tried in order; the first 200 response wins. A station that
//! no mirror knows is a valid "absent" result and is cached as such, so a
//! misspelled id does not hammer the mirrors on every query.

use crate::load::cache::FetchCache;
use crate::types::station::Station;
use log::{info, warn};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

const META_MIRRORS: &[&str] = &[
    "https://raw.meteostat.net/stations/{id}.json",
    "https://cdn.jsdelivr.net/gh/meteostat/weather-stations/stations/{id}.json",
];

/// How long a cached metadata record (or its absence) stays valid.
const META_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Resolves station ids to metadata records, with a persistent cache.
pub struct StationLookup {
    http: Client,
    cache: FetchCache<Option<Station>>,
}

impl StationLookup {
    pub fn new(cache_dir: &Path, http: Client) -> Self {
        StationLookup {
            http,
            cache: FetchCache::new(cache_dir),
        }
    }

    /// Looks up metadata for `id`. Returns `None` when no mirror knows the
    /// station or all mirrors fail; failures are logged, never raised.
    pub async fn lookup(&self, id: &str) -> Option<Station> {
        let key = format!("station-meta-{id}");
        self.cache
            .get_or_compute(&key, META_TTL, self.fetch(id))
            .await
    }

    async fn fetch(&self, id: &str) -> Option<Station> {
        for mirror in META_MIRRORS {
            let url = mirror.replace("{id}", id);
            match self.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<Station>().await {
                        Ok(station) => return Some(station),
                        Err(e) => {
                            warn!("failed to parse station metadata from {url}: {e}");
                            continue;
                        }
                    }
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    info!("station {id} not found at {url}");
                    continue;
                }
                Ok(response) => {
                    warn!(
                        "station metadata request to {url} returned status {}",
                        response.status()
                    );
                    continue;
                }
                Err(e) => {
                    warn!("station metadata request to {url} failed: {e}");
                    continue;
                }
            }
        }
        None
    }
}
