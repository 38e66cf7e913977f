use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{error::ParseLabelError, scene::rain::RainIntensity};

/// Wind speed above which every cloud is marked as blown by strong wind.
pub const STRONG_WIND_KMH: f64 = 25.0;

const MIN_DURATION_S: f64 = 4.0;
const MIN_RAIN_SPACING: f64 = 10.0;
/// Density of every layer after the first, relative to the first.
const BACK_LAYER_DENSITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudCoverageTier {
    Scattered,
    Broken,
    Overcast,
}

impl CloudCoverageTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudCoverageTier::Scattered => "scattered",
            CloudCoverageTier::Broken => "broken",
            CloudCoverageTier::Overcast => "overcast",
        }
    }

    fn base_layout(&self) -> CloudLayerConfig {
        let (particle_count, layer_count, spacing, height_offset, scale) = match self {
            CloudCoverageTier::Scattered => (4, 1, 40.0, 15.0, 0.7),
            CloudCoverageTier::Broken => (6, 2, 25.0, 25.0, 1.0),
            CloudCoverageTier::Overcast => (8, 3, 15.0, 35.0, 1.3),
        };

        CloudLayerConfig {
            particle_count,
            layer_count,
            spacing,
            height_offset,
            scale,
        }
    }
}

impl fmt::Display for CloudCoverageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudCoverageTier {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scattered" => Ok(CloudCoverageTier::Scattered),
            "broken" => Ok(CloudCoverageTier::Broken),
            "overcast" => Ok(CloudCoverageTier::Overcast),
            _ => Err(ParseLabelError {
                kind: "cloud coverage",
                value: s.to_string(),
                expected: "scattered, broken, overcast",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudLayerConfig {
    pub particle_count: u32,
    pub layer_count: u32,
    pub spacing: f64,
    pub height_offset: f64,
    pub scale: f64,
}

impl CloudLayerConfig {
    /// Number of clouds in 1-based `layer`. The front layer is the densest.
    pub fn particles_in_layer(&self, layer: u32) -> u32 {
        let density = if layer == 1 { 1.0 } else { BACK_LAYER_DENSITY };
        (f64::from(self.particle_count) * density).ceil() as u32
    }

    pub fn total_particles(&self) -> u32 {
        (1..=self.layer_count).map(|layer| self.particles_in_layer(layer)).sum()
    }
}

/// Layout for a coverage tier. Rain forces the overcast tier and densifies it.
///
/// Spacing is divided by the count multiplier on top of the count increase, so
/// rainy skies get denser twice over.
pub fn layout_for(
    tier: CloudCoverageTier,
    is_raining: bool,
    intensity: RainIntensity,
) -> CloudLayerConfig {
    if !is_raining {
        return tier.base_layout();
    }

    let mut config = CloudCoverageTier::Overcast.base_layout();
    let count_mult = intensity.count_multiplier();

    config.particle_count = (f64::from(config.particle_count) * count_mult).floor() as u32;
    config.scale *= intensity.scale_multiplier();
    config.spacing = (config.spacing / count_mult).max(MIN_RAIN_SPACING);
    config
}

/// Seconds for one cloud traversal, shorter under stronger wind, never below 4.
pub fn cloud_duration(wind_speed_kmh: f64) -> f64 {
    (20.0 - wind_speed_kmh.max(0.0).powf(1.5) / 20.0).max(MIN_DURATION_S)
}

/// Multiplier on cloud speed when rain co-occurs, between 0.5 and 1.5.
pub fn rain_speed_factor(wind_speed_kmh: f64) -> f64 {
    wind_speed_kmh.clamp(5.0, 15.0) / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudTone {
    White,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudParticle {
    pub layer: u32,
    pub index: u32,
    pub tone: CloudTone,
    pub top_px: f64,
    /// Random start offset in percent, only set for dry skies.
    pub left_percent: Option<f64>,
    pub keyframes: &'static str,
    pub duration_s: f64,
    pub delay_s: f64,
    pub strong_wind: bool,
}

/// Places every cloud of `config`, layer by layer.
///
/// Negative delays stagger each cloud's phase within its own layer.
pub fn place_clouds<R: Rng + ?Sized>(
    config: &CloudLayerConfig,
    wind_speed_kmh: f64,
    is_raining: bool,
    rng: &mut R,
) -> Vec<CloudParticle> {
    let base_duration = cloud_duration(wind_speed_kmh);
    let strong_wind = wind_speed_kmh > STRONG_WIND_KMH;
    let mut clouds = Vec::with_capacity(config.total_particles() as usize);

    for layer in 1..=config.layer_count {
        let in_layer = config.particles_in_layer(layer);
        let layer_f = f64::from(layer - 1);

        for index in 0..in_layer {
            let phase = f64::from(index) / f64::from(in_layer);

            let cloud = if is_raining {
                let duration_s = base_duration / rain_speed_factor(wind_speed_kmh);
                CloudParticle {
                    layer,
                    index,
                    tone: CloudTone::Dark,
                    top_px: -20.0 + layer_f * 60.0,
                    left_percent: None,
                    keyframes: "cloudMoveRain",
                    duration_s,
                    delay_s: -(duration_s * phase),
                    strong_wind,
                }
            } else {
                CloudParticle {
                    layer,
                    index,
                    tone: CloudTone::White,
                    top_px: layer_f * config.height_offset + f64::from(index) * config.spacing,
                    left_percent: Some(rng.gen_range(-10.0..10.0)),
                    keyframes: "cloudMove",
                    duration_s: base_duration,
                    delay_s: -(base_duration * phase),
                    strong_wind,
                }
            };

            clouds.push(cloud);
        }
    }

    clouds
}
