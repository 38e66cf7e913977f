use anyhow::Context;
use chrono::{Local, Timelike};
use clap::{Args, Parser, Subcommand};
use std::io;

use weatherdash_core::{
    CloudCoverageTier, Config, DevOverrides, RainIntensity, SceneView, WeatherFetchOrchestrator,
    WeatherReading, WeatherType, WeatherUpdate, provider_from_config, scene_rng,
};

use crate::output::{TextRenderer, format_reading};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Current weather with an animated scene plan")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Seed for the scene's random jitter, for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the full update, render plan included, as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default city used by `show`.
    Configure {
        /// City name; prompted for when absent.
        #[arg(long)]
        default_city: Option<String>,
    },

    /// Fetch current weather for a city and render its scene.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Render a scene from manual values without touching the network.
    Simulate {
        /// clear, cloudy or rainy.
        #[arg(long = "weather")]
        weather_type: Option<WeatherType>,

        /// Wind speed in km/h.
        #[arg(long)]
        wind: Option<f64>,

        /// Relative humidity in percent.
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        humidity: Option<u8>,

        /// light, moderate or heavy.
        #[arg(long)]
        rain: Option<RainIntensity>,

        /// scattered, broken or overcast; applies to partly cloudy skies.
        #[arg(long)]
        clouds: Option<CloudCoverageTier>,

        #[command(flatten)]
        plan: PlanArgs,
    },
}

impl Command {
    /// Overrides carried by `simulate`, `None` for other commands.
    pub fn overrides(&self) -> Option<DevOverrides> {
        match self {
            Command::Simulate {
                weather_type,
                wind,
                humidity,
                rain,
                clouds,
                ..
            } => Some(DevOverrides {
                weather_type: *weather_type,
                wind_speed_kmh: wind.map(|w| w.max(0.0)),
                humidity_percent: *humidity,
                rain_intensity: *rain,
                cloud_intensity: *clouds,
            }),
            _ => None,
        }
    }
}

/// Reading the simulation starts from before overrides are applied.
pub fn simulation_base() -> WeatherReading {
    WeatherReading::new(0, 0.0, 50, "Simulation")
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let overrides = self.command.overrides();

        match self.command {
            Command::Configure { default_city } => {
                let mut config = Config::load()?;

                let city = match default_city {
                    Some(city) => city,
                    None => inquire::Text::new("Default city:")
                        .with_help_message("Used by `weatherdash show` when no city is given")
                        .prompt()
                        .context("Failed to read default city")?,
                };
                let city = normalize_city(&city)?;

                config.set_default_city(city);
                config.save()?;
                println!("Default city set to {city}");
            }
            Command::Show { city, plan } => {
                let config = Config::load()?;
                let city = match city {
                    Some(city) => city,
                    None => config.default_city()?.to_string(),
                };

                let provider = provider_from_config(&config);
                let orchestrator = WeatherFetchOrchestrator::new(provider.clone(), provider);
                let hour = Local::now().hour();

                let update = orchestrator
                    .update(&city, hour, None, &mut scene_rng(plan.seed))
                    .await?;
                present(update, plan.json)?;
            }
            Command::Simulate { plan, .. } => {
                let update = WeatherUpdate::compose(
                    &simulation_base(),
                    overrides.as_ref(),
                    &mut scene_rng(plan.seed),
                );
                present(update, plan.json)?;
            }
        }

        Ok(())
    }
}

/// Trimmed city name, or an error for blank input.
fn normalize_city(city: &str) -> anyhow::Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        anyhow::bail!("Default city must not be empty");
    }
    Ok(city)
}

fn present(update: WeatherUpdate, json: bool) -> anyhow::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(&update).context("Failed to serialize update")?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", format_reading(&update));

    let mut view = SceneView::new(TextRenderer::new(io::stdout()));
    view.apply(update.plan);
    Ok(())
}
