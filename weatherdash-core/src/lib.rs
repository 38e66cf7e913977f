//! Core library for `weatherdash`.
//!
//! This crate defines:
//! - The weather condition catalog and the scene composer (code, wind and
//!   humidity in, render plan out)
//! - Abstractions over the geocoding and forecast services, with an Open-Meteo client
//! - The fetch orchestrator and the render collaborator boundary
//! - Configuration handling
//!
//! It is used by `weatherdash-cli`, but any front-end that can draw a
//! [`RenderPlan`] can reuse it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod render;
pub mod scene;

pub use catalog::label_for;
pub use config::{Config, Endpoints};
pub use error::{ParseLabelError, UpdateError};
pub use model::{DevOverrides, Location, WeatherReading, WeatherType};
pub use orchestrator::{WeatherFetchOrchestrator, WeatherUpdate};
pub use provider::{ForecastProvider, Geocoder, open_meteo::OpenMeteoProvider, provider_from_config};
pub use render::{SceneRenderer, SceneView};
pub use scene::{
    RenderPlan, SceneClass, compose,
    cloud::{CloudCoverageTier, CloudLayerConfig},
    rain::RainIntensity,
    scene_rng,
};
