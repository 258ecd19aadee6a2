//! Provides the `DailyClient` for requesting day-by-day observations.
//!
//! Obtained via [`Meteofuse::daily()`]. Daily rows are indexed at midnight,
//! so the builder accepts plain dates and widens them internally.

use crate::clients::ensure_supported;
use crate::error::MeteofuseError;
use crate::meteofuse::Meteofuse;
use crate::timeseries::timeseries::TimeSeries;
use crate::types::granularity::Granularity;
use crate::types::parameter::Parameter;
use crate::types::provider::ProviderId;
use crate::types::query::Query;
use bon::bon;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

/// Every parameter the daily provider can serve.
pub const SUPPORTED_DAILY_PARAMETERS: &[Parameter] = &[
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

/// Parameters requested when the caller does not pick any.
pub const DEFAULT_DAILY_PARAMETERS: &[Parameter] = &[
    Parameter::Tavg,
    Parameter::Tmin,
    Parameter::Tmax,
    Parameter::Prcp,
    Parameter::Wspd,
    Parameter::Wdir,
    Parameter::Pres,
];

/// Providers that serve daily data.
pub const SUPPORTED_DAILY_PROVIDERS: &[ProviderId] = &[ProviderId::MeteostatDaily];

/// Providers consulted when the caller does not pick any.
pub const DEFAULT_DAILY_PROVIDERS: &[ProviderId] = &[ProviderId::MeteostatDaily];

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// A request builder for daily weather data.
///
/// Instances are created by [`Meteofuse::daily()`]. Start the builder with
/// `.station(id)` or `.stations(ids)`, set the mandatory `.start()` and
/// `.end()` dates, then `.call().await`.
///
/// # Example
///
/// ```no_run
/// # use meteofuse::{Meteofuse, MeteofuseError};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), MeteofuseError> {
/// let client = Meteofuse::new().await?;
/// let series = client
///     .daily()
///     .station("10637")
///     .start(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
///     .end(NaiveDate::from_ymd_opt(2020, 1, 31).unwrap())
///     .call()
///     .await?;
/// println!("days with data: {}", series.len());
/// # Ok(())
/// # }
/// ```
pub struct DailyClient<'a> {
    client: &'a Meteofuse,
}

#[bon]
impl<'a> DailyClient<'a> {
    pub(crate) fn new(client: &'a Meteofuse) -> Self {
        Self { client }
    }

    /// Requests daily data for a single station id.
    ///
    /// Optional builder methods: `.parameters(Vec<Parameter>)` (defaults to
    /// [`DEFAULT_DAILY_PARAMETERS`]), `.providers(Vec<ProviderId>)`
    /// (defaults to [`DEFAULT_DAILY_PROVIDERS`]) and `.timezone(Tz)`.
    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
        start: NaiveDate,
        end: NaiveDate,
        parameters: Option<Vec<Parameter>>,
        providers: Option<Vec<ProviderId>>,
        timezone: Option<Tz>,
    ) -> Result<TimeSeries, MeteofuseError> {
        self.run(vec![station.to_string()], start, end, parameters, providers, timezone)
            .await
    }

    /// Requests daily data for several stations at once.
    #[builder(start_fn = stations)]
    #[doc(hidden)]
    pub async fn build_stations(
        &self,
        #[builder(start_fn)] stations: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
        parameters: Option<Vec<Parameter>>,
        providers: Option<Vec<ProviderId>>,
        timezone: Option<Tz>,
    ) -> Result<TimeSeries, MeteofuseError> {
        self.run(stations, start, end, parameters, providers, timezone)
            .await
    }

    async fn run(
        &self,
        stations: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
        parameters: Option<Vec<Parameter>>,
        providers: Option<Vec<ProviderId>>,
        timezone: Option<Tz>,
    ) -> Result<TimeSeries, MeteofuseError> {
        let providers = providers.unwrap_or_else(|| DEFAULT_DAILY_PROVIDERS.to_vec());
        ensure_supported(&providers, SUPPORTED_DAILY_PROVIDERS, Granularity::Daily)?;
        let query = Query {
            stations,
            parameters: parameters.unwrap_or_else(|| DEFAULT_DAILY_PARAMETERS.to_vec()),
            start: midnight(start),
            end: midnight(end),
            providers,
            granularity: Granularity::Daily,
            timezone,
        };
        self.client.load(query).await
    }
}
