//! Weather state to render plan.
//!
//! Everything in here is a pure function of its inputs plus an injected RNG.
//! Seeding the RNG makes every plan reproducible.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::model::{DevOverrides, WeatherReading};

pub mod cloud;
pub mod rain;

use cloud::{CloudCoverageTier, CloudLayerConfig, CloudParticle, STRONG_WIND_KMH};
use rain::RainField;

/// Weather codes rendered as rain (drizzle, rain and rain showers).
pub const RAIN_CODES: [i32; 9] = [51, 53, 55, 61, 63, 65, 80, 81, 82];

/// Top-level visual mode of the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneClass {
    Clear,
    Cloudy,
    Rainy,
    Windy,
    None,
}

impl SceneClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            SceneClass::Clear => "clear",
            SceneClass::Cloudy => "cloudy",
            SceneClass::Rainy => "rainy",
            SceneClass::Windy => "windy",
            SceneClass::None => "none",
        }
    }
}

/// Everything the rendering collaborator needs to draw one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub scene: SceneClass,
    pub cloud_tier: Option<CloudCoverageTier>,
    pub cloud_config: Option<CloudLayerConfig>,
    pub clouds: Vec<CloudParticle>,
    pub rain: Option<RainField>,
    pub is_raining: bool,
    pub strong_wind: bool,
    pub animation_duration_s: f64,
}

impl RenderPlan {
    fn bare(scene: SceneClass, wind_speed_kmh: f64) -> Self {
        Self {
            scene,
            cloud_tier: None,
            cloud_config: None,
            clouds: Vec::new(),
            rain: None,
            is_raining: false,
            strong_wind: wind_speed_kmh > STRONG_WIND_KMH,
            animation_duration_s: cloud::cloud_duration(wind_speed_kmh),
        }
    }

    fn with_clouds<R: Rng + ?Sized>(
        mut self,
        tier: CloudCoverageTier,
        is_raining: bool,
        intensity: rain::RainIntensity,
        wind_speed_kmh: f64,
        rng: &mut R,
    ) -> Self {
        let tier = if is_raining { CloudCoverageTier::Overcast } else { tier };
        let config = cloud::layout_for(tier, is_raining, intensity);

        self.clouds = cloud::place_clouds(&config, wind_speed_kmh, is_raining, rng);
        self.cloud_tier = Some(tier);
        self.cloud_config = Some(config);
        self.is_raining = is_raining;
        self
    }

    pub fn rain_particle_count(&self) -> Option<u32> {
        self.rain.as_ref().map(|rain| rain.particle_count)
    }
}

/// Picks the scene for a reading and lays out its clouds and rain.
pub fn compose<R: Rng + ?Sized>(
    reading: &WeatherReading,
    overrides: Option<&DevOverrides>,
    rng: &mut R,
) -> RenderPlan {
    let no_overrides = DevOverrides::default();
    let overrides = overrides.unwrap_or(&no_overrides);

    let code = overrides.effective_code(reading.code);
    let wind = overrides.effective_wind(reading).max(0.0);
    let humidity = overrides.effective_humidity(reading);
    let intensity = rain::resolve_intensity(overrides.rain_intensity);

    let plan = match code {
        0 => RenderPlan::bare(SceneClass::Clear, wind),
        2 => {
            let tier = overrides.cloud_intensity.unwrap_or(CloudCoverageTier::Broken);
            RenderPlan::bare(SceneClass::Cloudy, wind).with_clouds(tier, false, intensity, wind, rng)
        }
        3 => RenderPlan::bare(SceneClass::Cloudy, wind).with_clouds(
            CloudCoverageTier::Overcast,
            false,
            intensity,
            wind,
            rng,
        ),
        c if RAIN_CODES.contains(&c) => {
            let mut plan = RenderPlan::bare(SceneClass::Rainy, wind).with_clouds(
                CloudCoverageTier::Overcast,
                true,
                intensity,
                wind,
                rng,
            );
            plan.rain = Some(rain::rain_field(intensity, wind, humidity, rng));
            plan
        }
        _ => RenderPlan::bare(SceneClass::None, wind),
    };

    debug!(
        "Composed {} scene for code {code}: {} clouds, {:?} raindrops, {:.2}s cycle",
        plan.scene.css_class(),
        plan.clouds.len(),
        plan.rain_particle_count(),
        plan.animation_duration_s,
    );

    plan
}

/// RNG for plan composition: seeded for reproducible scenes, from entropy otherwise.
pub fn scene_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog, model::WeatherType};
    use rain::RainIntensity;

    fn reading(code: i32, wind: f64, humidity: u8) -> WeatherReading {
        WeatherReading::new(code, wind, humidity, "Testville")
    }

    #[test]
    fn clear_sky_has_no_particles() {
        let mut rng = scene_rng(Some(1));
        let plan = compose(&reading(0, 3.0, 50), None, &mut rng);

        assert_eq!(plan.scene, SceneClass::Clear);
        assert!(plan.cloud_config.is_none());
        assert!(plan.clouds.is_empty());
        assert_eq!(plan.rain_particle_count(), None);
        assert!(plan.animation_duration_s > 0.0);
    }

    #[test]
    fn overcast_code_forces_overcast_tier() {
        let mut rng = scene_rng(Some(2));
        let plan = compose(&reading(3, 10.0, 50), None, &mut rng);

        assert_eq!(plan.scene, SceneClass::Cloudy);
        assert_eq!(plan.cloud_tier, Some(CloudCoverageTier::Overcast));
        assert!(!plan.is_raining);
        assert_eq!(plan.cloud_config.map(|c| c.particle_count), Some(8));
        assert_eq!(plan.clouds.len(), 22);
    }

    #[test]
    fn partly_cloudy_uses_selected_coverage() {
        let mut rng = scene_rng(Some(3));
        let plan = compose(&reading(2, 0.0, 50), None, &mut rng);
        assert_eq!(plan.cloud_tier, Some(CloudCoverageTier::Broken));

        let overrides = DevOverrides {
            cloud_intensity: Some(CloudCoverageTier::Scattered),
            ..Default::default()
        };
        let plan = compose(&reading(2, 0.0, 50), Some(&overrides), &mut rng);
        assert_eq!(plan.scene, SceneClass::Cloudy);
        assert_eq!(plan.cloud_tier, Some(CloudCoverageTier::Scattered));
        assert_eq!(plan.clouds.len(), 4);
    }

    #[test]
    fn every_rain_code_is_rainy_and_overcast() {
        let mut rng = scene_rng(Some(4));
        for code in RAIN_CODES {
            let plan = compose(&reading(code, 8.0, 60), None, &mut rng);

            assert_eq!(plan.scene, SceneClass::Rainy, "code {code}");
            assert_eq!(plan.cloud_tier, Some(CloudCoverageTier::Overcast));
            assert!(plan.is_raining);
            assert!(plan.rain.is_some());
        }
    }

    #[test]
    fn unknown_and_unanimated_codes_have_no_scene() {
        let mut rng = scene_rng(Some(5));
        for code in [1, 45, 71, 95, 96, -3, 1234] {
            let plan = compose(&reading(code, 8.0, 60), None, &mut rng);
            assert_eq!(plan.scene, SceneClass::None, "code {code}");
            assert!(plan.clouds.is_empty());
        }

        assert_eq!(catalog::label_for(1234), "Unknown");
        assert_eq!(catalog::label_for(95), "Thunderstorm");
    }

    #[test]
    fn windy_rain_end_to_end() {
        let mut rng = scene_rng(Some(6));
        let plan = compose(&reading(61, 40.0, 80), None, &mut rng);

        assert_eq!(plan.scene, SceneClass::Rainy);
        assert_eq!(plan.cloud_tier, Some(CloudCoverageTier::Overcast));
        assert!(plan.strong_wind);

        let rain = plan.rain.as_ref().expect("rainy plan carries rain");
        assert_eq!(rain.intensity, RainIntensity::Moderate);
        assert!((200..=240).contains(&rain.particle_count));
        assert_eq!(rain.profile, rain::RainProfile::HeavyDrift);
        assert_eq!(rain.humidity, rain::HumidityClass::High);

        // moderate rain: floor(8 * 1.5) clouds up front
        assert_eq!(plan.cloud_config.map(|c| c.particle_count), Some(12));
    }

    #[test]
    fn rain_intensity_override_applies_to_fetched_rain() {
        let mut rng = scene_rng(Some(7));
        let overrides = DevOverrides {
            rain_intensity: Some(RainIntensity::Heavy),
            ..Default::default()
        };
        let plan = compose(&reading(80, 12.0, 50), Some(&overrides), &mut rng);

        let rain = plan.rain.expect("rainy plan carries rain");
        assert_eq!(rain.intensity, RainIntensity::Heavy);
        assert!((400..480).contains(&rain.particle_count));
        assert_eq!(plan.cloud_config.map(|c| c.particle_count), Some(16));
    }

    #[test]
    fn weather_type_override_replaces_fetched_code() {
        let mut rng = scene_rng(Some(8));
        let overrides = DevOverrides {
            weather_type: Some(WeatherType::Rainy),
            wind_speed_kmh: Some(2.0),
            humidity_percent: Some(20),
            rain_intensity: Some(RainIntensity::Light),
            cloud_intensity: None,
        };
        let plan = compose(&reading(0, 50.0, 90), Some(&overrides), &mut rng);

        assert_eq!(plan.scene, SceneClass::Rainy);
        assert!(!plan.strong_wind);
        let rain = plan.rain.expect("rainy plan carries rain");
        assert!((50..60).contains(&rain.particle_count));
        assert_eq!(rain.profile, rain::RainProfile::CalmFall);
        assert_eq!(rain.humidity, rain::HumidityClass::Low);

        let clear = DevOverrides {
            weather_type: Some(WeatherType::Clear),
            ..Default::default()
        };
        assert_eq!(compose(&reading(65, 5.0, 50), Some(&clear), &mut rng).scene, SceneClass::Clear);
    }

    #[test]
    fn strong_wind_starts_above_threshold() {
        let mut rng = scene_rng(Some(10));

        let calm = compose(&reading(3, 25.0, 50), None, &mut rng);
        assert!(!calm.strong_wind);
        assert!(calm.clouds.iter().all(|c| !c.strong_wind));

        let gusty = compose(&reading(3, 25.01, 50), None, &mut rng);
        assert!(gusty.strong_wind);
        assert!(gusty.clouds.iter().all(|c| c.strong_wind));

        assert!(!compose(&reading(0, 25.0, 50), None, &mut rng).strong_wind);
        assert!(compose(&reading(0, 25.01, 50), None, &mut rng).strong_wind);
    }

    #[test]
    fn duration_never_drops_below_floor() {
        let mut rng = scene_rng(Some(9));
        let mut prev = f64::INFINITY;
        for wind in (0..=120).step_by(5) {
            let plan = compose(&reading(2, f64::from(wind), 50), None, &mut rng);
            assert!(plan.animation_duration_s >= 4.0);
            assert!(plan.animation_duration_s <= prev);
            prev = plan.animation_duration_s;
        }
    }

    #[test]
    fn same_seed_same_plan() {
        let inputs = [reading(0, 0.0, 50), reading(2, 14.0, 45), reading(63, 27.0, 75)];

        for r in &inputs {
            let a = compose(r, None, &mut scene_rng(Some(42)));
            let b = compose(r, None, &mut scene_rng(Some(42)));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn unseeded_plans_differ_only_in_randomized_fields() {
        let r = reading(65, 20.0, 75);
        let a = compose(&r, None, &mut scene_rng(Some(100)));
        let b = compose(&r, None, &mut scene_rng(Some(200)));

        assert_eq!(a.scene, b.scene);
        assert_eq!(a.cloud_config, b.cloud_config);
        // rainy clouds carry no random fields
        assert_eq!(a.clouds, b.clouds);

        for plan in [&a, &b] {
            let rain = plan.rain.as_ref().unwrap();
            assert!((200..240).contains(&rain.particle_count));
            assert!(rain.drops.iter().all(|d| (0.0..140.0).contains(&d.left_percent)));
        }
    }
}
