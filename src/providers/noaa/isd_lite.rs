//! Adapter for NOAA ISD Lite: one gzipped fixed-width file per station
//! (identified by its USAF/WBAN pair) and year.
//!
//! Values arrive in tenths of their unit and with `-9999` sentinels for
//! missing data; the adapter converts to the shared units, derives relative
//! humidity from the temperature/dew point pair and validates cloud-cover
//! okta codes.

use crate::providers::converters::{ms_to_kmh, okta, round1, temp_dwpt_to_rhum};
use crate::providers::download::fetch_gzipped;
use crate::providers::error::ProviderError;
use crate::providers::ProviderAdapter;
use crate::table::observation::{Observation, ObservationTable};
use crate::types::parameter::Parameter;
use crate::types::station::Station;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::Client;

const ISD_LITE_ENDPOINT: &str = "https://www.ncei.noaa.gov/pub/data/noaa/isd-lite";

// Byte ranges of the fixed-width layout: date parts, then temp, dwpt,
// pres, wdir, wspd, cldc, prcp.
const YEAR: (usize, usize) = (0, 4);
const MONTH: (usize, usize) = (5, 7);
const DAY: (usize, usize) = (8, 10);
const HOUR: (usize, usize) = (11, 13);
const VALUE_FIELDS: [(usize, usize); 7] = [
    (13, 19),
    (19, 25),
    (25, 31),
    (31, 37),
    (37, 43),
    (43, 49),
    (49, 55),
];

pub struct NoaaIsdLite {
    http: Client,
}

impl NoaaIsdLite {
    pub fn new(http: Client) -> Self {
        NoaaIsdLite { http }
    }

    async fn load(&self, station: &Station, year: i32) -> Result<ObservationTable, ProviderError> {
        let Some(token) = self.cache_token(station) else {
            // No USAF identifier; the orchestrator normally filters this
            // out before dispatch.
            return Ok(ObservationTable::new());
        };
        let url = format!("{ISD_LITE_ENDPOINT}/{year}/{token}-{year}.gz");
        let bytes = fetch_gzipped(&self.http, &url).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(parse_isd_lite(&text, &station.id))
    }
}

#[async_trait]
impl ProviderAdapter for NoaaIsdLite {
    fn cache_token(&self, station: &Station) -> Option<String> {
        let usaf = station.identifiers.usaf.as_deref()?;
        let wban = station.identifiers.wban.as_deref().unwrap_or("99999");
        Some(format!("{usaf}-{wban}"))
    }

    async fn fetch_year(&self, station: &Station, year: i32) -> Option<ObservationTable> {
        match self.load(station, year).await {
            Ok(table) => Some(table),
            Err(e) if e.is_not_found() => {
                info!("NOAA ISD Lite: no data for station {} in {year}", station.id);
                None
            }
            Err(e) => {
                warn!(
                    "NOAA ISD Lite: fetch failed for station {} in {year}: {e}",
                    station.id
                );
                None
            }
        }
    }
}

fn field(line: &str, range: (usize, usize)) -> Option<&str> {
    let raw = line.get(range.0..range.1)?.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

fn value(line: &str, range: (usize, usize)) -> Option<f64> {
    let raw = field(line, range)?;
    if raw == "-9999" {
        return None;
    }
    raw.parse::<f64>().ok()
}

/// Parses an ISD Lite fixed-width payload into a normalized table indexed
/// under `station`. Rows the line format cannot account for are skipped.
pub(crate) fn parse_isd_lite(text: &str, station: &str) -> ObservationTable {
    let mut table = ObservationTable::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let time = field(line, YEAR)
            .zip(field(line, MONTH))
            .zip(field(line, DAY))
            .zip(field(line, HOUR))
            .and_then(|(((y, m), d), h)| {
                let date = NaiveDate::from_ymd_opt(
                    y.parse().ok()?,
                    m.parse().ok()?,
                    d.parse().ok()?,
                )?;
                date.and_hms_opt(h.parse().ok()?, 0, 0)
            });
        let Some(time) = time else {
            debug!("skipping malformed ISD Lite line for station {station}: {line}");
            continue;
        };

        let [temp, dwpt, pres, wdir, wspd, cldc, prcp] =
            VALUE_FIELDS.map(|range| value(line, range));

        let temp = temp.map(|v| v / 10.0);
        let dwpt = dwpt.map(|v| v / 10.0);

        let mut row = Observation::new(station, time);
        row.set_opt(Parameter::Temp, temp.map(round1));
        row.set_opt(Parameter::Pres, pres.map(|v| round1(v / 10.0)));
        row.set_opt(Parameter::Wdir, wdir);
        row.set_opt(Parameter::Wspd, wspd.map(|v| round1(ms_to_kmh(v / 10.0))));
        row.set_opt(Parameter::Cldc, cldc.and_then(okta));
        row.set_opt(Parameter::Prcp, prcp.map(|v| round1(v / 10.0)));
        if let (Some(t), Some(d)) = (temp, dwpt) {
            row.set(Parameter::Rhum, round1(temp_dwpt_to_rhum(t, d)));
        }
        table.push(row);
    }
    table
}
