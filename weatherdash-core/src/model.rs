use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::ParseLabelError,
    scene::{
        cloud::CloudCoverageTier,
        rain::{self, RainIntensity},
    },
};

/// Result of resolving a city name to coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}

/// Current conditions for one location, as consumed by the scene composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// WMO weather code.
    pub code: i32,
    pub wind_speed_kmh: f64,
    pub humidity_percent: u8,
    pub location_name: String,
    pub temperature_c: Option<f64>,
    pub observed_at: Option<NaiveDateTime>,
}

impl WeatherReading {
    pub fn new(code: i32, wind_speed_kmh: f64, humidity_percent: u8, location_name: impl Into<String>) -> Self {
        Self {
            code,
            wind_speed_kmh,
            humidity_percent,
            location_name: location_name.into(),
            temperature_c: None,
            observed_at: None,
        }
    }
}

/// Weather type selectable from the developer overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherType {
    Clear,
    Cloudy,
    Rainy,
}

impl WeatherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherType::Clear => "clear",
            WeatherType::Cloudy => "cloudy",
            WeatherType::Rainy => "rainy",
        }
    }

    /// Synthetic weather code for this type. Rain picks its code by intensity.
    pub fn code(&self, intensity: RainIntensity) -> i32 {
        match self {
            WeatherType::Clear => 0,
            WeatherType::Cloudy => 2,
            WeatherType::Rainy => match intensity {
                RainIntensity::Light => 51,
                RainIntensity::Moderate => 61,
                RainIntensity::Heavy => 65,
            },
        }
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clear" => Ok(WeatherType::Clear),
            "cloudy" => Ok(WeatherType::Cloudy),
            "rainy" => Ok(WeatherType::Rainy),
            _ => Err(ParseLabelError {
                kind: "weather type",
                value: s.to_string(),
                expected: "clear, cloudy, rainy",
            }),
        }
    }
}

/// Manual controls that bypass or adjust the fetched reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevOverrides {
    pub weather_type: Option<WeatherType>,
    pub wind_speed_kmh: Option<f64>,
    pub humidity_percent: Option<u8>,
    pub rain_intensity: Option<RainIntensity>,
    pub cloud_intensity: Option<CloudCoverageTier>,
}

impl DevOverrides {
    pub fn effective_code(&self, reading_code: i32) -> i32 {
        match self.weather_type {
            Some(kind) => kind.code(rain::resolve_intensity(self.rain_intensity)),
            None => reading_code,
        }
    }

    pub fn effective_wind(&self, reading: &WeatherReading) -> f64 {
        self.wind_speed_kmh.unwrap_or(reading.wind_speed_kmh)
    }

    pub fn effective_humidity(&self, reading: &WeatherReading) -> u8 {
        self.humidity_percent.unwrap_or(reading.humidity_percent).min(100)
    }

    /// Reading as displayed after the overrides are applied.
    pub fn apply_to(&self, reading: &WeatherReading) -> WeatherReading {
        WeatherReading {
            code: self.effective_code(reading.code),
            wind_speed_kmh: self.effective_wind(reading),
            humidity_percent: self.effective_humidity(reading),
            ..reading.clone()
        }
    }
}
