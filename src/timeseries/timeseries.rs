//! The `TimeSeries` wrapper around a merged observation table.
//!
//! A `TimeSeries` is immutable after construction: `apply`, `merge` and
//! `fetch` all return new values and never touch the receiver, so series
//! can be shared across tasks without locking.

use crate::table::observation::ObservationTable;
use crate::timeseries::error::TimeSeriesError;
use crate::types::granularity::Granularity;
use crate::types::parameter::Parameter;
use crate::types::station::Station;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use polars::prelude::{DataFrame, PolarsResult};
use std::collections::HashSet;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A station-and-time indexed series of weather observations over a fixed
/// coverage window.
///
/// `start` and `end` bound the logical window even when the underlying
/// table is sparser; they drive [`TimeSeries::expected_row_count`] and
/// completeness scoring. [`TimeSeries::len`] is the actual row count.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    granularity: Granularity,
    stations: Vec<Station>,
    parameters: Vec<Parameter>,
    table: ObservationTable,
    start: NaiveDateTime,
    end: NaiveDateTime,
    timezone: Option<Tz>,
}

impl TimeSeries {
    pub fn new(
        granularity: Granularity,
        stations: Vec<Station>,
        parameters: Vec<Parameter>,
        table: ObservationTable,
        start: NaiveDateTime,
        end: NaiveDateTime,
        timezone: Option<Tz>,
    ) -> Self {
        TimeSeries {
            granularity,
            stations,
            parameters,
            table,
            start,
            end,
            timezone,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }

    /// Row count of the underlying table, before squash or fill.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of rows a complete series would have: one per grid timestamp
    /// in `[start, end]` per station, independent of what was fetched.
    pub fn expected_row_count(&self) -> usize {
        self.granularity.rows_between(self.start, self.end) * self.stations.len()
    }

    /// Returns a new series with `func` mapped over one parameter's column,
    /// or over every populated cell when `parameter` is `None`.
    pub fn apply<F>(&self, func: F, parameter: Option<Parameter>) -> TimeSeries
    where
        F: Fn(f64) -> f64,
    {
        let mut copy = self.clone();
        copy.table = self.table.map_values(&func, parameter);
        copy
    }

    /// Concatenates this series with `others`.
    ///
    /// All inputs must agree on granularity, start, end and timezone;
    /// anything else would leave the result without a single well-defined
    /// expected row count, so it is rejected rather than truncated. The
    /// concatenated table must not contain duplicate (station, time) index
    /// pairs. Station lists are unioned with duplicates collapsed.
    pub fn merge(&self, others: &[TimeSeries]) -> Result<TimeSeries, TimeSeriesError> {
        if others.iter().any(|o| {
            o.granularity != self.granularity
                || o.start != self.start
                || o.end != self.end
                || o.timezone != self.timezone
        }) {
            return Err(TimeSeriesError::MergeMismatch);
        }

        let mut merged = self.clone();
        for other in others {
            merged.table.append(other.table.clone());
            for station in &other.stations {
                if !merged.stations.iter().any(|s| s.id == station.id) {
                    merged.stations.push(station.clone());
                }
            }
            for parameter in &other.parameters {
                if !merged.parameters.contains(parameter) {
                    merged.parameters.push(*parameter);
                }
            }
        }

        let mut seen = HashSet::new();
        for row in merged.table.rows() {
            if !seen.insert((row.station.clone(), row.time)) {
                return Err(TimeSeriesError::IndexCollision {
                    station: row.station.clone(),
                    time: row.time,
                });
            }
        }
        Ok(merged)
    }

    /// The terminal read: squash (default on), then fill (default off),
    /// then localize when a timezone is set, then sort by index.
    ///
    /// Squash must run before fill, otherwise duplicate indices would leave
    /// spurious rows on the grid; localize runs last so it acts on the
    /// final, complete index. Returns `None` when the table holds no data.
    pub fn fetch(&self) -> Option<ObservationTable> {
        self.fetch_with(true, false)
    }

    /// [`TimeSeries::fetch`] with explicit squash/fill switches.
    pub fn fetch_with(&self, squash: bool, fill: bool) -> Option<ObservationTable> {
        if self.table.is_empty() {
            return None;
        }
        let mut table = self.table.clone();
        if squash {
            table = table.squash();
        }
        if fill {
            let ids: Vec<String> = self.stations.iter().map(|s| s.id.clone()).collect();
            table = table.fill(&ids, self.start, self.end, self.granularity.step());
        }
        if let Some(tz) = self.timezone {
            table = table.localize(tz);
        }
        table.sort_by_index();
        Some(table)
    }

    /// Count of non-missing cells for `parameter` in the raw table, before
    /// squash or fill.
    pub fn count(&self, parameter: Parameter) -> usize {
        self.table.count(parameter)
    }

    /// Share of expected cells that carry a value, rounded to two decimals.
    ///
    /// With a parameter: `count(parameter) / expected_row_count`. Without:
    /// the mean of per-parameter completeness over the series' columns.
    /// Returns 0 when `fetch` yields no data at all.
    pub fn completeness(&self, parameter: Option<Parameter>) -> f64 {
        let Some(fetched) = self.fetch() else {
            return 0.0;
        };
        let expected = self.expected_row_count();
        if expected == 0 {
            return 0.0;
        }
        match parameter {
            Some(p) => round2(self.count(p) as f64 / expected as f64),
            None => {
                let columns = if self.parameters.is_empty() {
                    fetched.columns()
                } else {
                    self.parameters.clone()
                };
                if columns.is_empty() {
                    return 0.0;
                }
                let sum: f64 = columns
                    .iter()
                    .map(|p| self.completeness(Some(*p)))
                    .sum();
                round2(sum / columns.len() as f64)
            }
        }
    }

    /// Runs [`TimeSeries::fetch`] and exports the result as a polars
    /// `DataFrame` with the series' parameter columns.
    pub fn to_dataframe(&self) -> PolarsResult<Option<DataFrame>> {
        match self.fetch() {
            Some(table) => Ok(Some(table.to_dataframe(&self.parameters)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::observation::Observation;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn hourly_series(rows: Vec<Observation>) -> TimeSeries {
        TimeSeries::new(
            Granularity::Hourly,
            vec![Station::minimal("10637")],
            vec![Parameter::Temp, Parameter::Prcp],
            ObservationTable::with_rows(rows),
            dt(1, 0),
            dt(1, 23),
            None,
        )
    }

    #[test]
    fn expected_row_count_scales_with_stations() {
        let mut series = hourly_series(vec![]);
        assert_eq!(series.expected_row_count(), 24);
        series.stations.push(Station::minimal("06240"));
        assert_eq!(series.expected_row_count(), 48);
    }

    #[test]
    fn fetch_on_empty_table_is_none_and_completeness_zero() {
        let series = TimeSeries::new(
            Granularity::Daily,
            vec![Station::minimal("10637")],
            vec![Parameter::Tavg],
            ObservationTable::new(),
            dt(1, 0),
            dt(3, 0),
            None,
        );
        assert!(series.fetch().is_none());
        assert_eq!(series.completeness(None), 0.0);
        assert_eq!(series.completeness(Some(Parameter::Tavg)), 0.0);
    }

    #[test]
    fn completeness_is_one_for_a_full_grid() {
        let rows: Vec<Observation> = (0..24)
            .map(|h| {
                Observation::new("10637", dt(1, h))
                    .with(Parameter::Temp, 10.0)
                    .with(Parameter::Prcp, 0.0)
            })
            .collect();
        let series = hourly_series(rows);
        assert_eq!(series.completeness(Some(Parameter::Temp)), 1.0);
        assert_eq!(series.completeness(None), 1.0);
    }

    #[test]
    fn completeness_rounds_to_two_decimals() {
        let rows: Vec<Observation> = (0..8)
            .map(|h| Observation::new("10637", dt(1, h)).with(Parameter::Temp, 10.0))
            .collect();
        let series = hourly_series(rows);
        // 8 of 24 hours = 0.3333...
        assert_eq!(series.completeness(Some(Parameter::Temp)), 0.33);
        // prcp contributes 0.0 to the mean
        assert_eq!(series.completeness(None), 0.17);
    }

    #[test]
    fn count_uses_the_raw_unsquashed_table() {
        let series = hourly_series(vec![
            Observation::new("10637", dt(1, 0)).with(Parameter::Temp, 1.0),
            Observation::new("10637", dt(1, 0)).with(Parameter::Temp, 2.0),
        ]);
        assert_eq!(series.count(Parameter::Temp), 2);
        assert_eq!(series.fetch().unwrap().len(), 1);
    }

    #[test]
    fn apply_returns_a_copy_and_leaves_the_receiver_alone() {
        let series = hourly_series(vec![
            Observation::new("10637", dt(1, 0))
                .with(Parameter::Temp, 10.0)
                .with(Parameter::Prcp, 5.0),
        ]);
        let doubled = series.apply(|v| v * 2.0, Some(Parameter::Temp));
        assert_eq!(
            doubled.fetch().unwrap().rows()[0].value(Parameter::Temp),
            Some(20.0)
        );
        assert_eq!(
            doubled.fetch().unwrap().rows()[0].value(Parameter::Prcp),
            Some(5.0)
        );
        assert_eq!(
            series.fetch().unwrap().rows()[0].value(Parameter::Temp),
            Some(10.0)
        );

        let all = series.apply(|v| v + 1.0, None);
        let row = all.fetch().unwrap().rows()[0].clone();
        assert_eq!(row.value(Parameter::Temp), Some(11.0));
        assert_eq!(row.value(Parameter::Prcp), Some(6.0));
    }

    #[test]
    fn merge_rejects_divergent_bounds_and_mutates_neither_input() {
        let a = hourly_series(vec![Observation::new("10637", dt(1, 0)).with(Parameter::Temp, 1.0)]);
        let mut b = hourly_series(vec![
            Observation::new("06240", dt(1, 0)).with(Parameter::Temp, 2.0)
        ]);
        b.start = dt(1, 1);
        assert!(matches!(
            a.merge(std::slice::from_ref(&b)),
            Err(TimeSeriesError::MergeMismatch)
        ));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a.start, dt(1, 0));
        assert_eq!(b.start, dt(1, 1));
    }

    #[test]
    fn merge_unions_stations_and_rejects_index_collisions() {
        let a = hourly_series(vec![Observation::new("10637", dt(1, 0)).with(Parameter::Temp, 1.0)]);
        let mut b = hourly_series(vec![
            Observation::new("06240", dt(1, 0)).with(Parameter::Temp, 2.0)
        ]);
        b.stations = vec![Station::minimal("06240"), Station::minimal("10637")];

        let merged = a.merge(std::slice::from_ref(&b)).unwrap();
        assert_eq!(merged.len(), 2);
        // duplicate station collapsed
        assert_eq!(merged.stations().len(), 2);

        let colliding = hourly_series(vec![
            Observation::new("10637", dt(1, 0)).with(Parameter::Prcp, 0.0)
        ]);
        assert!(matches!(
            a.merge(&[colliding]),
            Err(TimeSeriesError::IndexCollision { .. })
        ));
    }

    #[test]
    fn fetch_squashes_before_filling() {
        // Two duplicate-index rows; with squash the filled grid has exactly
        // 24 rows, without it the duplicate would survive.
        let series = hourly_series(vec![
            Observation::new("10637", dt(1, 0)).with(Parameter::Temp, 1.0),
            Observation::new("10637", dt(1, 0)).with(Parameter::Prcp, 0.0),
        ]);
        let filled = series.fetch_with(true, true).unwrap();
        assert_eq!(filled.len(), 24);
        let first = &filled.rows()[0];
        assert_eq!(first.value(Parameter::Temp), Some(1.0));
        assert_eq!(first.value(Parameter::Prcp), Some(0.0));
        assert!(filled.rows()[1..].iter().all(|r| r.is_all_missing()));
    }

    #[test]
    fn fetch_localizes_last() {
        let mut series = hourly_series(vec![
            Observation::new("10637", dt(1, 5)).with(Parameter::Temp, 1.0)
        ]);
        series.timezone = Some(chrono_tz::Europe::Berlin);
        let filled = series.fetch_with(true, true).unwrap();
        // grid built on UTC bounds, then shifted by +1h (CET)
        assert_eq!(filled.len(), 24);
        assert_eq!(filled.rows()[0].time, dt(1, 1));
        let populated = filled
            .rows()
            .iter()
            .find(|r| !r.is_all_missing())
            .unwrap();
        assert_eq!(populated.time, dt(1, 6));
    }

    #[test]
    fn dataframe_export_uses_series_parameters() {
        let series = hourly_series(vec![
            Observation::new("10637", dt(1, 0)).with(Parameter::Temp, 1.0)
        ]);
        let df = series.to_dataframe().unwrap().unwrap();
        assert_eq!(df.get_column_names(), ["station", "time", "temp", "prcp"]);
        assert_eq!(df.height(), 1);
    }
}
