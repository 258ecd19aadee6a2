//! Adapter for the Meteostat SYNOP mirror: one gzipped CSV with a header
//! row per station and year.

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

const SYNOP_ENDPOINT: &str = "https://raw.meteostat.net/synop";

pub struct MeteostatSynop {
    http: Client,
}

impl MeteostatSynop {
    pub fn new(http: Client) -> Self {
        MeteostatSynop { http }
    }

    async fn load(&self, station: &Station, year: i32) -> Result<ObservationTable, ProviderError> {
        let url = format!("{SYNOP_ENDPOINT}/{year}/{}.csv.gz", station.id);
        let bytes = fetch_gzipped(&self.http, &url).await?;
        let text = String::from_utf8_lossy(&bytes);
        parse_synop_csv(&text, &station.id, &url)
    }
}

#[async_trait]
impl ProviderAdapter for MeteostatSynop {
    async fn fetch_year(&self, station: &Station, year: i32) -> Option<ObservationTable> {
        match self.load(station, year).await {
            Ok(table) => Some(table),
            Err(e) if e.is_not_found() => {
                info!("Meteostat SYNOP: no data for station {} in {year}", station.id);
                None
            }
            Err(e) => {
                warn!(
                    "Meteostat SYNOP: fetch failed for station {} in {year}: {e}",
                    station.id
                );
                None
            }
        }
    }
}

/// Parses a SYNOP CSV. The header names the parameter columns after the
/// leading `date` and `hour` pair; header names that are not part of the
/// shared parameter enumeration are ignored.
pub(crate) fn parse_synop_csv(
    text: &str,
    station: &str,
    url: &str,
) -> Result<ObservationTable, ProviderError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| ProviderError::Malformed {
        url: url.to_string(),
        message: "empty payload".to_string(),
    })?;
    let names: Vec<&str> = header.split(',').collect();
    if names.len() < 2 || names[0] != "date" || names[1] != "hour" {
        return Err(ProviderError::Malformed {
            url: url.to_string(),
            message: format!("unexpected header: {header}"),
        });
    }
    let columns: Vec<Option<Parameter>> = names[2..]
        .iter()
        .map(|name| Parameter::from_name(name))
        .collect();

    let mut table = ObservationTable::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let time = fields
            .first()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .zip(fields.get(1).and_then(|h| h.parse::<u32>().ok()))
            .and_then(|(date, hour)| date.and_hms_opt(hour, 0, 0));
        let Some(time) = time else {
            debug!("skipping malformed SYNOP line for station {station}: {line}");
            continue;
        };

        let mut row = Observation::new(station, time);
        for (offset, column) in columns.iter().enumerate() {
            let Some(parameter) = column else { continue };
            let value = fields
                .get(2 + offset)
                .and_then(|f| if f.is_empty() { None } else { f.parse::<f64>().ok() });
            row.set_opt(*parameter, value);
        }
        table.push(row);
    }
    Ok(table)
}
