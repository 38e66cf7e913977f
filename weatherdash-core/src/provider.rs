use crate::{
    Config,
    model::{Location, WeatherReading},
    provider::open_meteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Resolves a free-form city name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `Ok(None)` means the service answered but knows no such place.
    async fn resolve(&self, city: &str) -> anyhow::Result<Option<Location>>;
}

/// Fetches current conditions for a resolved location.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// `local_hour` (0-23) selects the hourly humidity sample.
    async fn current(&self, location: &Location, local_hour: u32) -> anyhow::Result<WeatherReading>;
}

/// Construct the Open-Meteo provider using the endpoints from config.
pub fn provider_from_config(config: &Config) -> OpenMeteoProvider {
    OpenMeteoProvider::with_endpoints(
        config.endpoints.geocoding_url.clone(),
        config.endpoints.forecast_url.clone(),
    )
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
