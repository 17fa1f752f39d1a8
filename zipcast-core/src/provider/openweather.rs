use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, ForecastEntry, LocationQuery, Units},
};

use super::WeatherProvider;

/// OpenWeather 2.5 client, queried by postal code.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    country: String,
    units: Units,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: &str,
        country: String,
        units: Units,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            country,
            units,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_owned();
        Self::new(
            api_key,
            &config.base_url,
            config.country.clone(),
            config.units,
            config.timeout(),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, zip: &str) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("zip", zip),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint, error = %e, "OpenWeather request could not be sent");
                WeatherError::generic()
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!(endpoint, error = %e, "Failed to read OpenWeather response body");
            WeatherError::generic()
        })?;

        if !status.is_success() {
            warn!(endpoint, %status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(WeatherError::from_body(&body));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(endpoint, error = %e, "Failed to parse OpenWeather JSON");
            WeatherError::generic()
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    temp_max: f64,
    #[serde(default)]
    temp_min: f64,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_description(weather: Vec<OwWeather>) -> String {
    weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_else(|| "Unknown".to_string())
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        CurrentConditions {
            place_name: parsed.name,
            country_code: parsed.sys.country,
            description: first_description(parsed.weather),
            temperature: parsed.main.temp,
            temp_max: parsed.main.temp_max,
            temp_min: parsed.main.temp_min,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            sunrise: unix_to_utc(parsed.sys.sunrise),
            sunset: unix_to_utc(parsed.sys.sunset),
        }
    }
}

impl From<OwForecastEntry> for ForecastEntry {
    fn from(entry: OwForecastEntry) -> Self {
        ForecastEntry {
            timestamp_text: entry.dt_txt,
            description: first_description(entry.weather),
            temperature: entry.main.temp,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self, location), fields(location = %location))]
    async fn current(&self, location: &LocationQuery) -> Result<CurrentConditions, WeatherError> {
        debug!("requesting current conditions");
        let parsed: OwCurrentResponse = self.get_json("weather", location.as_str()).await?;
        Ok(parsed.into())
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn forecast(&self, location: &LocationQuery) -> Result<Vec<ForecastEntry>, WeatherError> {
        debug!(country = %self.country, "requesting forecast");
        let zip = location.with_country(&self.country);
        let parsed: OwForecastResponse = self.get_json("forecast", &zip).await?;
        Ok(parsed.list.into_iter().map(ForecastEntry::from).collect())
    }

    fn units(&self) -> Units {
        self.units
    }
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_maps_to_conditions() {
        let body = r#"{
            "name": "New York",
            "sys": {"country": "US", "sunrise": 1705320000, "sunset": 1705355000},
            "weather": [{"description": "broken clouds"}, {"description": "mist"}],
            "main": {"temp": 4.5, "temp_max": 6.1, "temp_min": 2.9, "humidity": 71, "pressure": 1019},
            "wind": {"speed": 3.6}
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        let current = CurrentConditions::from(parsed);

        assert_eq!(current.place_name, "New York");
        assert_eq!(current.country_code, "US");
        assert_eq!(current.description, "broken clouds");
        assert_eq!(current.humidity_pct, 71);
        assert_eq!(current.pressure_hpa, 1019.0);
        assert_eq!(current.sunrise.timestamp(), 1705320000);
    }

    #[test]
    fn missing_description_becomes_unknown() {
        let body = r#"{"dt_txt": "2024-01-15 12:00:00", "main": {"temp": 1.0}, "weather": []}"#;
        let parsed: OwForecastEntry = serde_json::from_str(body).unwrap();
        assert_eq!(ForecastEntry::from(parsed).description, "Unknown");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let provider = OpenWeatherProvider::new(
            "KEY".into(),
            "http://localhost:1234/",
            "us".into(),
            Units::Metric,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
