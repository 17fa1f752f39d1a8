//! Text rendering of view state.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

use crate::{
    Config,
    model::{CurrentConditions, ForecastEntry, Units},
    store::{Variant, ViewState},
};

pub const LOADING_LINE: &str = "Loading...";
pub const EMPTY_LINE: &str = "No weather loaded yet. Enter a postal code.";

/// Renders [`ViewState`] as text. Sunrise/sunset are shown in `tz`.
#[derive(Debug, Clone)]
pub struct Renderer<Tz: TimeZone> {
    tz: Tz,
    forecast_heading: String,
}

impl Renderer<Local> {
    pub fn local(config: &Config) -> Self {
        Self::new(Local, config.forecast_mode.heading(config.forecast_limit))
    }
}

impl<Tz> Renderer<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(tz: Tz, forecast_heading: String) -> Self {
        Self { tz, forecast_heading }
    }

    pub fn render(&self, state: &ViewState) -> String {
        let mut lines = Vec::new();

        if let Some(notice) = &state.notice {
            lines.push(format!("Error: {notice}"));
        }

        match state.variant() {
            Variant::Loading => lines.push(LOADING_LINE.to_string()),
            Variant::Empty => lines.push(EMPTY_LINE.to_string()),
            Variant::Loaded => {
                if let Some(current) = &state.current {
                    self.render_current(&mut lines, current, state.units, state.show_details);
                    self.render_forecast(&mut lines, &state.forecast, state.units);
                }
            }
        }

        lines.join("\n")
    }

    fn render_current(
        &self,
        lines: &mut Vec<String>,
        current: &CurrentConditions,
        units: Units,
        show_details: bool,
    ) {
        let deg = units.temperature_symbol();

        lines.push(format!("== {}, {} ==", current.place_name, current.country_code));
        lines.push(format!("Current Weather: {}", current.description));
        lines.push(format!("Current Temperature: {} {deg}", current.temperature));
        lines.push(format!("Max Temperature: {} {deg}", current.temp_max));
        lines.push(format!("Min Temperature: {} {deg}", current.temp_min));

        if !show_details {
            lines.push("[Show More]".to_string());
            return;
        }

        lines.push("[Hide More]".to_string());
        lines.push(format!("Wind Speed: {} {}", current.wind_speed, units.speed_symbol()));
        lines.push(format!("Humidity: {} %", current.humidity_pct));
        lines.push(format!("Pressure: {} hPa", current.pressure_hpa));
        lines.push(format!("Sunrise: {}", self.clock(current.sunrise)));
        lines.push(format!("Sunset: {}", self.clock(current.sunset)));
    }

    fn render_forecast(&self, lines: &mut Vec<String>, forecast: &[ForecastEntry], units: Units) {
        lines.push("-".repeat(40));
        lines.push(self.forecast_heading.clone());

        for entry in forecast {
            let date = entry
                .date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| entry.timestamp_text.clone());
            lines.push(format!(
                "Date: {date} | Weather: {} | Temperature: {} {}",
                entry.description,
                entry.temperature,
                units.temperature_symbol()
            ));
        }
    }

    fn clock(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format("%H:%M").to_string()
    }
}
