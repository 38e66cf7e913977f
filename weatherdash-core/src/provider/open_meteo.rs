use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::{DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL},
    model::{Location, WeatherReading},
    provider::truncate_body,
};

use super::{ForecastProvider, Geocoder};

const HOURLY_FIELDS: &str = "temperature_2m,relativehumidity_2m,windspeed_10m";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Open-Meteo geocoding + forecast client. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    geocoding_url: String,
    forecast_url: String,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::with_endpoints(DEFAULT_GEOCODING_URL.to_string(), DEFAULT_FORECAST_URL.to_string())
    }
}

impl OpenMeteoProvider {
    pub fn with_endpoints(geocoding_url: String, forecast_url: String) -> Self {
        Self {
            geocoding_url,
            forecast_url,
            http: Client::new(),
        }
    }

    pub fn geocoding_url(&self) -> &str {
        &self.geocoding_url
    }

    pub fn forecast_url(&self) -> &str {
        &self.forecast_url
    }

    async fn get_body(&self, url: &str, query: &[(&str, String)], what: &str) -> Result<String> {
        debug!("GET {url} ({what})");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OmGeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmGeoResponse {
    // Omitted entirely when nothing matches.
    #[serde(default)]
    results: Vec<OmGeoResult>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: f64,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(default)]
    relativehumidity_2m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: OmCurrentWeather,
    hourly: OmHourly,
}

pub(crate) fn parse_geocoding(body: &str) -> Result<Option<Location>> {
    let parsed: OmGeoResponse =
        serde_json::from_str(body).context("Failed to parse Open-Meteo geocoding JSON")?;

    Ok(parsed.results.into_iter().next().map(|r| Location {
        name: r.name,
        latitude: r.latitude,
        longitude: r.longitude,
        country: r.country,
    }))
}

pub(crate) fn parse_forecast(body: &str, location: &Location, local_hour: u32) -> Result<WeatherReading> {
    let parsed: OmForecastResponse =
        serde_json::from_str(body).context("Failed to parse Open-Meteo forecast JSON")?;

    let humidity = parsed
        .hourly
        .relativehumidity_2m
        .get(local_hour as usize)
        .copied()
        .flatten()
        .ok_or_else(|| anyhow!("Open-Meteo forecast has no humidity sample for hour {local_hour}"))?;

    let current = parsed.current_weather;
    let observed_at = current
        .time
        .as_deref()
        .and_then(|t| NaiveDateTime::parse_from_str(t, TIME_FORMAT).ok());

    Ok(WeatherReading {
        code: current.weathercode.round() as i32,
        wind_speed_kmh: current.windspeed.max(0.0),
        humidity_percent: humidity.round().clamp(0.0, 100.0) as u8,
        location_name: location.name.clone(),
        temperature_c: Some(current.temperature),
        observed_at,
    })
}

#[async_trait]
impl Geocoder for OpenMeteoProvider {
    async fn resolve(&self, city: &str) -> Result<Option<Location>> {
        let query = [("name", city.to_string()), ("count", "1".to_string())];
        let body = self.get_body(&self.geocoding_url, &query, "geocoding").await?;
        parse_geocoding(&body)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn current(&self, location: &Location, local_hour: u32) -> Result<WeatherReading> {
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
        ];
        let body = self.get_body(&self.forecast_url, &query, "forecast").await?;
        parse_forecast(&body, location, local_hour)
    }
}
