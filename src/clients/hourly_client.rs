//! Provides the `HourlyClient` for requesting hour-by-hour observations.
//!
//! Obtained via [`Meteofuse::hourly()`], the client collects the request
//! parameters through a builder and hands the resulting query to the
//! provider orchestrator.

use crate::clients::ensure_supported;
use crate::error::MeteofuseError;
use crate::meteofuse::Meteofuse;
use crate::timeseries::timeseries::TimeSeries;
use crate::types::granularity::Granularity;
use crate::types::parameter::Parameter;
use crate::types::provider::ProviderId;
use crate::types::query::Query;
use bon::bon;
use chrono::NaiveDateTime;
use chrono_tz::Tz;

/// Every parameter at least one hourly provider can serve.
pub const SUPPORTED_HOURLY_PARAMETERS: &[Parameter] = &[
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
    Parameter::Cldc,
    Parameter::Coco,
];

/// Parameters requested when the caller does not pick any.
pub const DEFAULT_HOURLY_PARAMETERS: &[Parameter] = &[
    Parameter::Temp,
    Parameter::Rhum,
    Parameter::Prcp,
    Parameter::Wdir,
    Parameter::Wspd,
    Parameter::Pres,
];

/// Providers that serve hourly data, in descending merge priority.
pub const SUPPORTED_HOURLY_PROVIDERS: &[ProviderId] = &[
    ProviderId::MeteostatHourly,
    ProviderId::NoaaIsdLite,
    ProviderId::MeteostatSynop,
];

/// Providers consulted when the caller does not pick any.
pub const DEFAULT_HOURLY_PROVIDERS: &[ProviderId] = &[ProviderId::MeteostatHourly];

/// A request builder for hourly weather data.
///
/// Instances are created by [`Meteofuse::hourly()`]. Start the builder with
/// `.station(id)` or `.stations(ids)`, set the mandatory `.start()` and
/// `.end()` bounds, then `.call().await` to run the fetch and merge.
///
/// # Example
///
/// ```no_run
/// # use meteofuse::{Meteofuse, MeteofuseError, Parameter, ProviderId};
/// use chrono::NaiveDate;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), MeteofuseError> {
/// let client = Meteofuse::new().await?;
/// let series = client
///     .hourly()
///     .station("10637") // Frankfurt
///     .start(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
///     .end(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(23, 0, 0).unwrap())
///     .parameters(vec![Parameter::Temp, Parameter::Prcp])
///     .providers(vec![ProviderId::MeteostatHourly, ProviderId::NoaaIsdLite])
///     .call()
///     .await?;
/// if let Ok(Some(df)) = series.to_dataframe() {
///     println!("{df}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct HourlyClient<'a> {
    client: &'a Meteofuse,
}

#[bon]
impl<'a> HourlyClient<'a> {
    pub(crate) fn new(client: &'a Meteofuse) -> Self {
        Self { client }
    }

    /// Requests hourly data for a single station id.
    ///
    /// Optional builder methods: `.parameters(Vec<Parameter>)` (defaults to
    /// [`DEFAULT_HOURLY_PARAMETERS`]), `.providers(Vec<ProviderId>)`
    /// (defaults to [`DEFAULT_HOURLY_PROVIDERS`]) and `.timezone(Tz)` to
    /// localize the returned index.
    #[builder(start_fn = station)]
    #[doc(hidden)]
    pub async fn build_station(
        &self,
        #[builder(start_fn)] station: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        parameters: Option<Vec<Parameter>>,
        providers: Option<Vec<ProviderId>>,
        timezone: Option<Tz>,
    ) -> Result<TimeSeries, MeteofuseError> {
        self.run(vec![station.to_string()], start, end, parameters, providers, timezone)
            .await
    }

    /// Requests hourly data for several stations at once. The stations share
    /// one time window and parameter set; the result carries one sub-series
    /// per station.
    #[builder(start_fn = stations)]
    #[doc(hidden)]
    pub async fn build_stations(
        &self,
        #[builder(start_fn)] stations: Vec<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
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
        start: NaiveDateTime,
        end: NaiveDateTime,
        parameters: Option<Vec<Parameter>>,
        providers: Option<Vec<ProviderId>>,
        timezone: Option<Tz>,
    ) -> Result<TimeSeries, MeteofuseError> {
        let providers = providers.unwrap_or_else(|| DEFAULT_HOURLY_PROVIDERS.to_vec());
        ensure_supported(&providers, SUPPORTED_HOURLY_PROVIDERS, Granularity::Hourly)?;
        let query = Query {
            stations,
            parameters: parameters.unwrap_or_else(|| DEFAULT_HOURLY_PARAMETERS.to_vec()),
            start,
            end,
            providers,
            granularity: Granularity::Hourly,
            timezone,
        };
        self.client.load(query).await
    }
}
