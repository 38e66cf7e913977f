use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ParseLabelError;

/// Drop count used when an intensity label is not recognized.
pub const FALLBACK_PARTICLE_COUNT: u32 = 200;

/// Upper bound of the random extra drops, as a fraction of the base count.
const COUNT_JITTER: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainIntensity {
    Light,
    #[default]
    Moderate,
    Heavy,
}

impl RainIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RainIntensity::Light => "light",
            RainIntensity::Moderate => "moderate",
            RainIntensity::Heavy => "heavy",
        }
    }

    pub const fn all() -> &'static [RainIntensity] {
        &[RainIntensity::Light, RainIntensity::Moderate, RainIntensity::Heavy]
    }

    /// Factor applied to the overcast cloud count when rain co-occurs.
    pub fn count_multiplier(&self) -> f64 {
        match self {
            RainIntensity::Light => 1.0,
            RainIntensity::Moderate => 1.5,
            RainIntensity::Heavy => 2.0,
        }
    }

    /// Factor applied to the overcast cloud scale when rain co-occurs.
    pub fn scale_multiplier(&self) -> f64 {
        match self {
            RainIntensity::Light => 1.0,
            RainIntensity::Moderate => 1.3,
            RainIntensity::Heavy => 1.6,
        }
    }
}

impl fmt::Display for RainIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RainIntensity {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(RainIntensity::Light),
            "moderate" => Ok(RainIntensity::Moderate),
            "heavy" => Ok(RainIntensity::Heavy),
            _ => Err(ParseLabelError {
                kind: "rain intensity",
                value: s.to_string(),
                expected: "light, moderate, heavy",
            }),
        }
    }
}

/// The manual selection when present, `Moderate` otherwise.
pub fn resolve_intensity(manual: Option<RainIntensity>) -> RainIntensity {
    manual.unwrap_or_default()
}

/// Like [`resolve_intensity`], for a raw label. Invalid labels count as absent.
pub fn resolve_intensity_label(manual: Option<&str>) -> RainIntensity {
    resolve_intensity(manual.and_then(|label| label.parse().ok()))
}

pub fn particle_count_for(intensity: RainIntensity) -> u32 {
    match intensity {
        RainIntensity::Light => 50,
        RainIntensity::Moderate => 200,
        RainIntensity::Heavy => 400,
    }
}

pub fn particle_count_for_label(label: &str) -> u32 {
    label
        .parse()
        .map(particle_count_for)
        .unwrap_or(FALLBACK_PARTICLE_COUNT)
}

/// Keyframe profile for falling drops, chosen by wind speed alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RainProfile {
    CalmFall,
    LightDrift,
    MediumDrift,
    HeavyDrift,
}

impl RainProfile {
    pub fn for_wind(wind_speed_kmh: f64) -> Self {
        if wind_speed_kmh <= 5.0 {
            RainProfile::CalmFall
        } else if wind_speed_kmh <= 15.0 {
            RainProfile::LightDrift
        } else if wind_speed_kmh <= 30.0 {
            RainProfile::MediumDrift
        } else {
            RainProfile::HeavyDrift
        }
    }

    pub fn keyframes(&self) -> &'static str {
        match self {
            RainProfile::CalmFall => "rainFall",
            RainProfile::LightDrift => "rainFallLight",
            RainProfile::MediumDrift => "rainFallMedium",
            RainProfile::HeavyDrift => "rainFallHeavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumidityClass {
    Low,
    Normal,
    High,
}

impl HumidityClass {
    pub fn for_humidity(humidity_percent: u8) -> Self {
        if humidity_percent > 70 {
            HumidityClass::High
        } else if humidity_percent < 40 {
            HumidityClass::Low
        } else {
            HumidityClass::Normal
        }
    }

    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            HumidityClass::Low => Some("low-humidity"),
            HumidityClass::Normal => None,
            HumidityClass::High => Some("high-humidity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Raindrop {
    /// Start position in percent of container width, may exceed 100.
    pub left_percent: f64,
    pub duration_s: f64,
    /// Always in (-2, 0].
    pub delay_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainField {
    pub intensity: RainIntensity,
    pub particle_count: u32,
    pub profile: RainProfile,
    pub humidity: HumidityClass,
    pub drops: Vec<Raindrop>,
}

/// Base fall time of a drop before jitter, floored at 0.5s.
pub fn drop_duration(wind_speed_kmh: f64) -> f64 {
    (1.2 - wind_speed_kmh / 60.0).max(0.5)
}

/// Base count for the intensity plus up to 20% extra drops, never fewer.
pub fn jittered_count<R: Rng + ?Sized>(intensity: RainIntensity, rng: &mut R) -> u32 {
    let base = particle_count_for(intensity);
    let extra = rng.gen_range(0.0..1.0) * f64::from(base) * COUNT_JITTER;
    base + extra.floor() as u32
}

pub fn rain_field<R: Rng + ?Sized>(
    intensity: RainIntensity,
    wind_speed_kmh: f64,
    humidity_percent: u8,
    rng: &mut R,
) -> RainField {
    let particle_count = jittered_count(intensity, rng);
    let base_duration = drop_duration(wind_speed_kmh);

    let drops = (0..particle_count)
        .map(|_| Raindrop {
            left_percent: rng.gen_range(0.0..140.0),
            duration_s: base_duration + rng.gen_range(0.0..0.2),
            delay_s: -rng.gen_range(0.0..2.0),
        })
        .collect();

    RainField {
        intensity,
        particle_count,
        profile: RainProfile::for_wind(wind_speed_kmh),
        humidity: HumidityClass::for_humidity(humidity_percent),
        drops,
    }
}
