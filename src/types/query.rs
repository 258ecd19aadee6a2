//! The validated request that drives the provider orchestrator.

use crate::load::error::LoadError;
use crate::types::granularity::Granularity;
use crate::types::parameter::Parameter;
use crate::types::provider::ProviderId;
use chrono::NaiveDateTime;
use chrono_tz::Tz;

/// A fully-resolved data request: which stations, parameters, time window,
/// candidate providers and granularity to load.
///
/// Requested parameters that no candidate provider supports are not an
/// error; they simply come back all-missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub stations: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub providers: Vec<ProviderId>,
    pub granularity: Granularity,
    pub timezone: Option<Tz>,
}

impl Query {
    /// Checks caller-supplied invariants: a non-inverted time range and at
    /// least one station.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.start > self.end {
            return Err(LoadError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.stations.is_empty() {
            return Err(LoadError::NoStations);
        }
        Ok(())
    }
}
