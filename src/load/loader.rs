//! The provider orchestrator: fans a query out into per-(provider,
//! station, year) fetches, gathers them, and hands the per-provider tables
//! to the priority merge engine.

use crate::load::cache::FetchCache;
use crate::providers::AdapterRegistry;
use crate::table::observation::ObservationTable;
use crate::timeseries::merge::merge_tables;
use crate::timeseries::timeseries::TimeSeries;
use crate::types::provider::{provider_spec, ProviderSpec};
use crate::types::query::Query;
use crate::types::station::Station;
use chrono::Datelike;
use futures_util::{stream, StreamExt};
use log::{debug, warn};
use std::time::Duration;

/// How long a fetched year-chunk (or its absence) stays valid.
pub const FETCH_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Upper bound on concurrently running fetch tasks.
const MAX_CONCURRENT_FETCHES: usize = 5;

/// Loads a time series for an already-validated set of station records.
///
/// Candidate providers are filtered by granularity, parameter overlap and
/// start date, then every surviving (provider, station, year) combination
/// is fetched through the cache on a bounded concurrent pool. All fetches
/// are gathered to completion before merging; chunk failures have already
/// been normalized to absent by the adapters and only leave gaps.
pub async fn load_timeseries(
    query: &Query,
    stations: &[Station],
    cache: &FetchCache<Option<ObservationTable>>,
    adapters: &AdapterRegistry,
) -> TimeSeries {
    let mut specs: Vec<ProviderSpec> = query
        .providers
        .iter()
        .map(|id| provider_spec(*id))
        .filter(|spec| {
            spec.granularity == query.granularity
                && spec.parameters.iter().any(|p| query.parameters.contains(p))
                && query.start >= spec.start
        })
        .collect();
    specs.sort_by_key(|spec| spec.priority);

    // One task per (provider, station, year); `seq` restores dispatch
    // order after the unordered gather so merge inputs are reproducible.
    let mut tasks = Vec::new();
    let mut seq = 0usize;
    for (provider_index, spec) in specs.iter().enumerate() {
        let Some(adapter) = adapters.get(spec.id) else {
            warn!("no adapter registered for provider {}", spec.id);
            continue;
        };
        for station in stations {
            let Some(token) = adapter.cache_token(station) else {
                debug!(
                    "station {} lacks the identifiers required by {}",
                    station.id, spec.id
                );
                continue;
            };
            for year in query.start.year()..=query.end.year() {
                let adapter = adapter.clone();
                let key = format!("{}-{token}-{year}", spec.id);
                tasks.push(async move {
                    let chunk = cache
                        .get_or_compute(&key, FETCH_TTL, adapter.fetch_year(station, year))
                        .await;
                    (seq, provider_index, chunk)
                });
                seq += 1;
            }
        }
    }

    let mut results: Vec<(usize, usize, Option<ObservationTable>)> = stream::iter(tasks)
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;
    results.sort_by_key(|(seq, _, _)| *seq);

    let mut per_provider: Vec<ObservationTable> = vec![ObservationTable::new(); specs.len()];
    for (_, provider_index, chunk) in results {
        if let Some(table) = chunk {
            per_provider[provider_index].append(table);
        }
    }

    // Providers that produced nothing at all contribute no merge input.
    let inputs: Vec<ObservationTable> =
        per_provider.into_iter().filter(|t| !t.is_empty()).collect();

    let mut table = merge_tables(inputs);
    table.retain_parameters(&query.parameters);
    table.retain_window(query.start, query.end);

    TimeSeries::new(
        query.granularity,
        stations.to_vec(),
        query.parameters.clone(),
        table,
        query.start,
        query.end,
        query.timezone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderAdapter;
    use crate::table::observation::Observation;
    use crate::types::granularity::Granularity;
    use crate::types::parameter::Parameter;
    use crate::types::provider::ProviderId;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// Serves fixed rows for every requested year and records the calls.
    struct FixtureAdapter {
        rows: Vec<Observation>,
        calls: Arc<AtomicUsize>,
        years_seen: Arc<Mutex<Vec<i32>>>,
    }

    impl FixtureAdapter {
        fn new(rows: Vec<Observation>) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Vec<i32>>>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let years = Arc::new(Mutex::new(Vec::new()));
            (
                FixtureAdapter {
                    rows,
                    calls: calls.clone(),
                    years_seen: years.clone(),
                },
                calls,
                years,
            )
        }
    }

    #[async_trait]
    impl ProviderAdapter for FixtureAdapter {
        async fn fetch_year(&self, _station: &Station, year: i32) -> Option<ObservationTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.years_seen.lock().unwrap().push(year);
            let rows: Vec<Observation> = self
                .rows
                .iter()
                .filter(|r| r.time.year() == year)
                .cloned()
                .collect();
            if rows.is_empty() {
                None
            } else {
                Some(ObservationTable::with_rows(rows))
            }
        }
    }

    struct AbsentAdapter;

    #[async_trait]
    impl ProviderAdapter for AbsentAdapter {
        async fn fetch_year(&self, _station: &Station, _year: i32) -> Option<ObservationTable> {
            None
        }
    }

    fn hourly_query(providers: Vec<ProviderId>) -> Query {
        Query {
            stations: vec!["10637".to_string()],
            parameters: vec![Parameter::Temp, Parameter::Wdir],
            start: dt(2020, 1, 1, 0),
            end: dt(2020, 1, 1, 23),
            providers,
            granularity: Granularity::Hourly,
            timezone: None,
        }
    }

    #[tokio::test]
    async fn merges_providers_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        // Highest-priority provider has TEMP at hour 0; the lower-priority
        // one disagrees on TEMP and adds WDIR.
        let (high, _, _) = FixtureAdapter::new(vec![
            Observation::new("10637", dt(2020, 1, 1, 0)).with(Parameter::Temp, 20.0),
        ]);
        let (low, _, _) = FixtureAdapter::new(vec![
            Observation::new("10637", dt(2020, 1, 1, 0))
                .with(Parameter::Temp, 99.0)
                .with(Parameter::Wdir, 270.0),
        ]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatHourly, Arc::new(high));
        adapters.register(ProviderId::MeteostatSynop, Arc::new(low));

        let query = hourly_query(vec![
            ProviderId::MeteostatSynop,
            ProviderId::MeteostatHourly,
        ]);
        let series = load_timeseries(&query, &stations, &cache, &adapters).await;

        let table = series.fetch().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].value(Parameter::Temp), Some(20.0));
        assert_eq!(table.rows()[0].value(Parameter::Wdir), Some(270.0));
    }

    #[tokio::test]
    async fn partitions_the_range_into_calendar_years() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        let (adapter, calls, years) = FixtureAdapter::new(vec![
            Observation::new("10637", dt(2019, 12, 31, 23)).with(Parameter::Temp, 1.0),
            Observation::new("10637", dt(2020, 1, 1, 0)).with(Parameter::Temp, 2.0),
        ]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatHourly, Arc::new(adapter));

        let mut query = hourly_query(vec![ProviderId::MeteostatHourly]);
        query.start = dt(2019, 12, 31, 0);
        query.end = dt(2021, 1, 1, 23);

        let series = load_timeseries(&query, &stations, &cache, &adapters).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let mut seen = years.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![2019, 2020, 2021]);
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn repeated_loads_hit_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        let (adapter, calls, _) = FixtureAdapter::new(vec![
            Observation::new("10637", dt(2020, 1, 1, 0)).with(Parameter::Temp, 20.0),
        ]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatHourly, Arc::new(adapter));

        let query = hourly_query(vec![ProviderId::MeteostatHourly]);
        load_timeseries(&query, &stations, &cache, &adapters).await;
        load_timeseries(&query, &stations, &cache, &adapters).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_results_are_cached_too() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        let (adapter, calls, _) = FixtureAdapter::new(vec![]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatHourly, Arc::new(adapter));

        let query = hourly_query(vec![ProviderId::MeteostatHourly]);
        let series = load_timeseries(&query, &stations, &cache, &adapters).await;
        load_timeseries(&query, &stations, &cache, &adapters).await;

        assert!(series.fetch().is_none());
        assert_eq!(series.completeness(None), 0.0);
        // the failing fetch was not repeated
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn filters_providers_by_granularity_and_start_date() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        let (daily, daily_calls, _) = FixtureAdapter::new(vec![]);
        let (synop, synop_calls, _) = FixtureAdapter::new(vec![]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatDaily, Arc::new(daily));
        adapters.register(ProviderId::MeteostatSynop, Arc::new(synop));

        // Hourly query before the SYNOP provider's start date: the daily
        // provider mismatches on granularity, SYNOP on start.
        let mut query = hourly_query(vec![
            ProviderId::MeteostatDaily,
            ProviderId::MeteostatSynop,
        ]);
        query.start = dt(2010, 1, 1, 0);
        query.end = dt(2010, 1, 1, 23);

        load_timeseries(&query, &stations, &cache, &adapters).await;
        assert_eq!(daily_calls.load(Ordering::SeqCst), 0);
        assert_eq!(synop_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_absent_provider_leaves_the_other_intact() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        let (good, _, _) = FixtureAdapter::new(vec![
            Observation::new("10637", dt(2020, 1, 1, 5)).with(Parameter::Temp, 3.2),
        ]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatHourly, Arc::new(AbsentAdapter));
        adapters.register(ProviderId::NoaaIsdLite, Arc::new(good));

        let query = hourly_query(vec![ProviderId::MeteostatHourly, ProviderId::NoaaIsdLite]);
        let series = load_timeseries(&query, &stations, &cache, &adapters).await;

        let table = series.fetch().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].value(Parameter::Temp), Some(3.2));
    }

    #[tokio::test]
    async fn trims_to_window_and_requested_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FetchCache::new(dir.path());
        let stations = vec![Station::minimal("10637")];

        let (adapter, _, _) = FixtureAdapter::new(vec![
            Observation::new("10637", dt(2020, 1, 1, 0))
                .with(Parameter::Temp, 20.0)
                .with(Parameter::Pres, 1016.0),
            Observation::new("10637", dt(2020, 6, 1, 0)).with(Parameter::Temp, 25.0),
        ]);
        let mut adapters = AdapterRegistry::empty();
        adapters.register(ProviderId::MeteostatHourly, Arc::new(adapter));

        let query = hourly_query(vec![ProviderId::MeteostatHourly]);
        let series = load_timeseries(&query, &stations, &cache, &adapters).await;

        // the June row is outside the window; pres was not requested
        assert_eq!(series.len(), 1);
        let table = series.fetch().unwrap();
        assert_eq!(table.rows()[0].value(Parameter::Pres), None);
        assert_eq!(table.rows()[0].value(Parameter::Temp), Some(20.0));
    }
}
