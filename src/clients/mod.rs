//! Granularity-specific request builders returned by the [`Meteofuse`]
//! client.
//!
//! [`Meteofuse`]: crate::Meteofuse

pub mod daily_client;
pub mod hourly_client;

use crate::load::error::LoadError;
use crate::types::granularity::Granularity;
use crate::types::provider::ProviderId;

/// Rejects explicitly requested providers that do not serve the client's
/// granularity. Runs before any station lookup or fetch.
pub(crate) fn ensure_supported(
    requested: &[ProviderId],
    supported: &[ProviderId],
    granularity: Granularity,
) -> Result<(), LoadError> {
    for provider in requested {
        if !supported.contains(provider) {
            return Err(LoadError::UnsupportedProvider {
                provider: *provider,
                granularity,
            });
        }
    }
    Ok(())
}
