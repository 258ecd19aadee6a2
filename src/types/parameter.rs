//! The fixed enumeration of weather parameters shared by all providers.
//!
//! Every provider adapter renames its native columns to these parameters
//! before handing data to the merge pipeline, so tables from different
//! upstreams always line up column-wise.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A weather parameter (observation column).
///
/// The set is fixed at compile time; a provider that does not report a
/// parameter simply never populates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    /// Air temperature (°C).
    Temp,
    /// Dew point (°C).
    Dwpt,
    /// Relative humidity (%).
    Rhum,
    /// Precipitation total (mm).
    Prcp,
    /// Snow depth (mm).
    Snow,
    /// Wind direction (°).
    Wdir,
    /// Average wind speed (km/h).
    Wspd,
    /// Peak wind gust (km/h).
    Wpgt,
    /// Sea-level air pressure (hPa).
    Pres,
    /// Sunshine duration (minutes).
    Tsun,
    /// Cloud cover (okta).
    Cldc,
    /// Weather condition code.
    Coco,
    /// Daily average temperature (°C).
    Tavg,
    /// Daily minimum temperature (°C).
    Tmin,
    /// Daily maximum temperature (°C).
    Tmax,
}

impl Parameter {
    /// The lowercase column name used by the Meteostat ecosystem.
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Temp => "temp",
            Parameter::Dwpt => "dwpt",
            Parameter::Rhum => "rhum",
            Parameter::Prcp => "prcp",
            Parameter::Snow => "snow",
            Parameter::Wdir => "wdir",
            Parameter::Wspd => "wspd",
            Parameter::Wpgt => "wpgt",
            Parameter::Pres => "pres",
            Parameter::Tsun => "tsun",
            Parameter::Cldc => "cldc",
            Parameter::Coco => "coco",
            Parameter::Tavg => "tavg",
            Parameter::Tmin => "tmin",
            Parameter::Tmax => "tmax",
        }
    }

    /// Resolves a column name back to a parameter, e.g. when reading
    /// provider CSV headers. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Parameter> {
        match name {
            "temp" => Some(Parameter::Temp),
            "dwpt" => Some(Parameter::Dwpt),
            "rhum" => Some(Parameter::Rhum),
            "prcp" => Some(Parameter::Prcp),
            "snow" => Some(Parameter::Snow),
            "wdir" => Some(Parameter::Wdir),
            "wspd" => Some(Parameter::Wspd),
            "wpgt" => Some(Parameter::Wpgt),
            "pres" => Some(Parameter::Pres),
            "tsun" => Some(Parameter::Tsun),
            "cldc" => Some(Parameter::Cldc),
            "coco" => Some(Parameter::Coco),
            "tavg" => Some(Parameter::Tavg),
            "tmin" => Some(Parameter::Tmin),
            "tmax" => Some(Parameter::Tmax),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips() {
        for p in [
            Parameter::Temp,
            Parameter::Rhum,
            Parameter::Wpgt,
            Parameter::Tmax,
        ] {
            assert_eq!(Parameter::from_name(p.name()), Some(p));
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(Parameter::from_name("dewpoint"), None);
    }
}
