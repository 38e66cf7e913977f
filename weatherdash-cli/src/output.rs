use std::io::Write;

use weatherdash_core::{RenderPlan, SceneClass, SceneRenderer, WeatherUpdate};

/// Text panel shown above the scene, like the widget's readout.
pub fn format_reading(update: &WeatherUpdate) -> String {
    let reading = &update.reading;
    let mut lines = vec![reading.location_name.clone()];

    if let Some(t) = reading.temperature_c {
        // as i64 so -0.2 doesn't show up as -0
        lines.push(format!("  Temperature: {}°C", t.round() as i64));
    }
    lines.push(format!("  Condition:   {}", update.condition));
    lines.push(format!("  Wind:        {} km/h", reading.wind_speed_kmh.round() as i64));
    lines.push(format!("  Humidity:    {}%", reading.humidity_percent));

    if let Some(at) = reading.observed_at {
        lines.push(format!("  Observed:    {}", at.format("%Y-%m-%d %H:%M")));
    }

    lines.join("\n")
}

/// Draws a plan as a short text summary.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
    elements: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, elements: 0 }
    }

    /// Elements of the scene currently on screen.
    pub fn elements(&self) -> usize {
        self.elements
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn describe(plan: &RenderPlan) -> Vec<String> {
        let mut lines = vec![format!(
            "Scene: {} (cycle {:.1}s{})",
            plan.scene.css_class(),
            plan.animation_duration_s,
            if plan.strong_wind { ", strong wind" } else { "" },
        )];

        if plan.scene == SceneClass::Clear {
            lines.push("  sun".to_string());
        }

        if let (Some(tier), Some(config)) = (plan.cloud_tier, plan.cloud_config) {
            let per_layer: Vec<String> = (1..=config.layer_count)
                .map(|layer| config.particles_in_layer(layer).to_string())
                .collect();
            lines.push(format!(
                "  clouds: {} {} (layers {}, scale {:.2}, spacing {:.1})",
                plan.clouds.len(),
                tier,
                per_layer.join("/"),
                config.scale,
                config.spacing,
            ));
        }

        if let Some(rain) = &plan.rain {
            let humidity = rain
                .humidity
                .css_class()
                .map(|c| format!(", {c}"))
                .unwrap_or_default();
            lines.push(format!(
                "  rain: {} {} drops ({}{})",
                rain.particle_count,
                rain.intensity,
                rain.profile.keyframes(),
                humidity,
            ));
        }

        lines
    }
}

impl<W: Write> SceneRenderer for TextRenderer<W> {
    fn clear(&mut self) {
        self.elements = 0;
    }

    fn render(&mut self, plan: &RenderPlan) {
        let sun = usize::from(plan.scene == SceneClass::Clear);
        let drops = plan.rain.as_ref().map_or(0, |r| r.drops.len());
        self.elements += sun + plan.clouds.len() + drops;

        for line in Self::describe(plan) {
            if let Err(err) = writeln!(self.out, "{line}") {
                log::warn!("Failed to write scene output: {err}");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherdash_core::{
        DevOverrides, RainIntensity, SceneView, WeatherReading, WeatherType, scene_rng,
    };

    fn rendered(update: WeatherUpdate) -> (String, usize) {
        let mut view = SceneView::new(TextRenderer::new(Vec::new()));
        view.apply(update.plan);

        let renderer = view.into_renderer();
        let elements = renderer.elements();
        (String::from_utf8(renderer.into_inner()).unwrap(), elements)
    }

    #[test]
    fn reading_panel_rounds_values() {
        let mut reading = WeatherReading::new(2, 12.6, 64, "Vienna");
        reading.temperature_c = Some(-0.3);

        let update = WeatherUpdate::compose(&reading, None, &mut scene_rng(Some(1)));
        let text = format_reading(&update);

        assert!(text.starts_with("Vienna"));
        assert!(text.contains("Temperature: 0°C"));
        assert!(text.contains("Condition:   Partly cloudy"));
        assert!(text.contains("Wind:        13 km/h"));
        assert!(text.contains("Humidity:    64%"));
        assert!(!text.contains("Observed"));
    }

    #[test]
    fn rainy_scene_summary() {
        let overrides = DevOverrides {
            weather_type: Some(WeatherType::Rainy),
            wind_speed_kmh: Some(40.0),
            humidity_percent: Some(80),
            rain_intensity: Some(RainIntensity::Heavy),
            cloud_intensity: None,
        };
        let base = WeatherReading::new(0, 0.0, 50, "Simulation");
        let update = WeatherUpdate::compose(&base, Some(&overrides), &mut scene_rng(Some(2)));
        let drops = update.plan.rain_particle_count().unwrap() as usize;

        let (text, elements) = rendered(update);

        assert!(text.starts_with("Scene: rainy"));
        assert!(text.contains("strong wind"));
        assert!(text.contains("clouds: 42 overcast (layers 16/13/13, scale 2.08, spacing 10.0)"));
        assert!(text.contains("heavy drops (rainFallHeavy, high-humidity)"));
        assert_eq!(elements, 42 + drops);
    }

    #[test]
    fn clear_scene_draws_only_the_sun() {
        let update = WeatherUpdate::compose(
            &WeatherReading::new(0, 3.0, 50, "Cairo"),
            None,
            &mut scene_rng(Some(3)),
        );

        let (text, elements) = rendered(update);
        assert!(text.starts_with("Scene: clear"));
        assert!(text.contains("  sun"));
        assert!(!text.contains("clouds"));
        assert_eq!(elements, 1);
    }
}
