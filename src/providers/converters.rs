//! Unit conversions applied while normalizing provider payloads.

/// Meters per second to kilometers per hour.
pub(crate) fn ms_to_kmh(value: f64) -> f64 {
    value * 3.6
}

/// Relative humidity (%) from air temperature and dew point (°C), via the
/// Magnus approximation.
pub(crate) fn temp_dwpt_to_rhum(temp: f64, dwpt: f64) -> f64 {
    let gamma = |t: f64| (17.625 * t) / (243.04 + t);
    100.0 * (gamma(dwpt).exp() / gamma(temp).exp())
}

/// Accepts only valid okta cloud-cover codes (0..=8).
pub(crate) fn okta(value: f64) -> Option<f64> {
    let code = value.round();
    if (0.0..=8.0).contains(&code) {
        Some(code)
    } else {
        None
    }
}

/// Rounds to one decimal, matching the precision upstream files carry.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
