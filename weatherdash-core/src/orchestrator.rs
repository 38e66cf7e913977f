use log::{debug, warn};
use rand::Rng;
use serde::Serialize;

use crate::{
    catalog,
    error::UpdateError,
    model::{DevOverrides, WeatherReading},
    provider::{ForecastProvider, Geocoder},
    scene::{self, RenderPlan},
};

/// Everything one successful update puts on screen.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherUpdate {
    /// Reading as displayed, with any overrides already applied.
    pub reading: WeatherReading,
    pub condition: &'static str,
    pub plan: RenderPlan,
}

impl WeatherUpdate {
    /// Builds the displayed update for `reading` without touching the network.
    pub fn compose<R: Rng + ?Sized>(
        reading: &WeatherReading,
        overrides: Option<&DevOverrides>,
        rng: &mut R,
    ) -> Self {
        let shown = match overrides {
            Some(o) => o.apply_to(reading),
            None => reading.clone(),
        };

        Self {
            condition: catalog::label_for(shown.code),
            plan: scene::compose(reading, overrides, rng),
            reading: shown,
        }
    }
}

/// Resolve city, fetch current conditions, compose the scene.
#[derive(Debug)]
pub struct WeatherFetchOrchestrator<G, F> {
    geocoder: G,
    forecast: F,
}

impl<G: Geocoder, F: ForecastProvider> WeatherFetchOrchestrator<G, F> {
    pub fn new(geocoder: G, forecast: F) -> Self {
        Self { geocoder, forecast }
    }

    /// Fetches the reading for `city`. `local_hour` picks the humidity sample.
    pub async fn fetch(&self, city: &str, local_hour: u32) -> Result<WeatherReading, UpdateError> {
        let location = self
            .geocoder
            .resolve(city)
            .await
            .map_err(|err| {
                warn!("Geocoding '{city}' failed: {err:#}");
                UpdateError::FetchFailed(err)
            })?
            .ok_or_else(|| {
                warn!("No location found for '{city}'");
                UpdateError::CityNotFound(city.to_string())
            })?;

        debug!(
            "Resolved '{city}' to {} ({:.4}, {:.4})",
            location.name, location.latitude, location.longitude
        );

        self.forecast
            .current(&location, local_hour)
            .await
            .map_err(|err| {
                warn!("Forecast for {} failed: {err:#}", location.name);
                UpdateError::FetchFailed(err)
            })
    }

    /// Full update. Fails without partial results if any step fails.
    pub async fn update<R: Rng + ?Sized>(
        &self,
        city: &str,
        local_hour: u32,
        overrides: Option<&DevOverrides>,
        rng: &mut R,
    ) -> Result<WeatherUpdate, UpdateError> {
        let reading = self.fetch(city, local_hour).await?;
        Ok(WeatherUpdate::compose(&reading, overrides, rng))
    }
}
