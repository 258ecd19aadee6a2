//! Adapter for the Meteostat bulk mirrors.
//!
//! The bulk endpoint publishes one gzipped, headerless CSV per station
//! covering its full history; the adapter downloads it and keeps only the
//! rows of the requested year.

use crate::providers::download::fetch_gzipped;
use crate::providers::error::ProviderError;
use crate::providers::ProviderAdapter;
use crate::table::observation::{Observation, ObservationTable};
use crate::types::granularity::Granularity;
use crate::types::parameter::Parameter;
use crate::types::station::Station;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use reqwest::Client;

const BULK_ENDPOINT: &str = "https://bulk.meteostat.net/v2";

// Column order of the headerless bulk CSVs, after the date (and, for
// hourly, hour) prefix columns.
const HOURLY_COLUMNS: &[Parameter] = &[
    Parameter::Temp,
    Parameter::Dwpt,
    Parameter::Rhum,
    Parameter::Prcp,
    Parameter::Snow,
    Parameter::Wdir,
    Parameter::Wspd,
    Parameter::Wpgt,
    Parameter::Pres,
    Parameter::Tsun,
    Parameter::Coco,
];
const DAILY_COLUMNS: &[Parameter] = &[
    Parameter::Tavg,
    Parameter::Tmin,
    Parameter::Tmax,
    Parameter::Prcp,
    Parameter::Snow,
    Parameter::Wdir,
    Parameter::Wspd,
    Parameter::Wpgt,
    Parameter::Pres,
    Parameter::Tsun,
];

pub struct MeteostatBulk {
    http: Client,
    granularity: Granularity,
}

impl MeteostatBulk {
    pub fn hourly(http: Client) -> Self {
        MeteostatBulk {
            http,
            granularity: Granularity::Hourly,
        }
    }

    pub fn daily(http: Client) -> Self {
        MeteostatBulk {
            http,
            granularity: Granularity::Daily,
        }
    }

    fn name(&self) -> &'static str {
        match self.granularity {
            Granularity::Hourly => "Meteostat Hourly",
            Granularity::Daily => "Meteostat Daily",
        }
    }

    async fn load(&self, station: &Station, year: i32) -> Result<ObservationTable, ProviderError> {
        let url = format!(
            "{BULK_ENDPOINT}/{}/{}.csv.gz",
            self.granularity.path_segment(),
            station.id
        );
        let bytes = fetch_gzipped(&self.http, &url).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(parse_bulk_csv(&text, &station.id, self.granularity, year))
    }
}

#[async_trait]
impl ProviderAdapter for MeteostatBulk {
    async fn fetch_year(&self, station: &Station, year: i32) -> Option<ObservationTable> {
        match self.load(station, year).await {
            Ok(table) => Some(table),
            Err(e) if e.is_not_found() => {
                info!("{}: no data for station {} in {year}", self.name(), station.id);
                None
            }
            Err(e) => {
                warn!(
                    "{}: fetch failed for station {} in {year}: {e}",
                    self.name(),
                    station.id
                );
                None
            }
        }
    }
}

/// Parses a headerless bulk CSV, keeping only rows of `year`. Lines that
/// fail to parse are skipped.
pub(crate) fn parse_bulk_csv(
    text: &str,
    station: &str,
    granularity: Granularity,
    year: i32,
) -> ObservationTable {
    let (columns, prefix_len) = match granularity {
        Granularity::Hourly => (HOURLY_COLUMNS, 2),
        Granularity::Daily => (DAILY_COLUMNS, 1),
    };

    let mut table = ObservationTable::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < prefix_len {
            debug!("skipping malformed bulk line for station {station}: {line}");
            continue;
        }
        let Ok(date) = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d") else {
            debug!("skipping bulk line with bad date for station {station}: {line}");
            continue;
        };
        if date.year() != year {
            continue;
        }
        let time = match granularity {
            Granularity::Hourly => {
                let Some(hour) = fields.get(1).and_then(|h| h.parse::<u32>().ok()) else {
                    debug!("skipping bulk line with bad hour for station {station}: {line}");
                    continue;
                };
                match date.and_hms_opt(hour, 0, 0) {
                    Some(t) => t,
                    None => continue,
                }
            }
            Granularity::Daily => match date.and_hms_opt(0, 0, 0) {
                Some(t) => t,
                None => continue,
            },
        };

        let mut row = Observation::new(station, time);
        for (offset, parameter) in columns.iter().enumerate() {
            let value = fields
                .get(prefix_len + offset)
                .and_then(|f| if f.is_empty() { None } else { f.parse::<f64>().ok() });
            row.set_opt(*parameter, value);
        }
        table.push(row);
    }
    table
}
