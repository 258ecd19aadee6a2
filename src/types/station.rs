//! Weather station metadata as served by the Meteostat station mirrors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata record for a single weather station.
///
/// Populated from the station metadata mirrors; when no metadata can be
/// found the record degrades to [`Station::minimal`] so a query can still
/// proceed with the station id alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// The Meteostat station identifier (e.g. "10637").
    pub id: String,
    /// Station names keyed by language code (e.g. `{"en": "Frankfurt Airport"}`).
    #[serde(default)]
    pub name: HashMap<String, String>,
    /// ISO country code.
    #[serde(default)]
    pub country: Option<String>,
    /// Region/state code, if available.
    #[serde(default)]
    pub region: Option<String>,
    /// IANA timezone name for the station's location.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Identifiers under which other networks know this station.
    #[serde(default)]
    pub identifiers: Identifiers,
    /// Geographical location, if available.
    #[serde(default)]
    pub location: Option<Location>,
}

/// Alternative identifiers for a station in other observation networks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identifiers {
    #[serde(default)]
    pub national: Option<String>,
    #[serde(default)]
    pub wmo: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub usaf: Option<String>,
    #[serde(default)]
    pub wban: Option<String>,
}

/// Geographical position of a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl Station {
    /// A bare record carrying only the station id, used when the metadata
    /// lookup comes back absent.
    pub fn minimal(id: &str) -> Self {
        Station {
            id: id.to_string(),
            name: HashMap::new(),
            country: None,
            region: None,
            timezone: None,
            identifiers: Identifiers::default(),
            location: None,
        }
    }
}
