use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, ForecastEntry, LocationQuery, Units},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Upstream weather service: one lookup for current conditions, one for the forecast series.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, location: &LocationQuery) -> Result<CurrentConditions, WeatherError>;

    /// Full forecast series in upstream order, untruncated.
    async fn forecast(&self, location: &LocationQuery) -> Result<Vec<ForecastEntry>, WeatherError>;

    /// Units the provider requests data in.
    fn units(&self) -> Units;
}

/// Construct the provider described by config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_key_present() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        let provider = provider_from_config(&cfg).expect("provider must build");
        assert_eq!(provider.units(), Units::Metric);
    }
}
