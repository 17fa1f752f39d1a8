//! Core library for the `zipcast` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind a [`WeatherProvider`] trait
//! - View state with pure transitions and request sequencing
//! - The fetch controller that runs requested effects
//! - Text rendering of view state
//!
//! It is used by `zipcast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod render;
pub mod store;

pub use config::Config;
pub use controller::FetchController;
pub use error::WeatherError;
pub use forecast::ForecastMode;
pub use model::{CurrentConditions, ForecastEntry, LocationQuery, Units, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::Renderer;
pub use store::{Action, Effect, RequestId, Variant, ViewState, reduce};
