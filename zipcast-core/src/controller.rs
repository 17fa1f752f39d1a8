//! Fetch controller: runs the effects the reducer asks for.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    Config,
    error::WeatherError,
    forecast::{self, ForecastMode},
    model::{LocationQuery, WeatherSnapshot},
    provider::WeatherProvider,
    store::{Action, Effect, ViewState, reduce},
};

#[derive(Debug, Clone)]
pub struct FetchController {
    provider: Arc<dyn WeatherProvider>,
    mode: ForecastMode,
    limit: usize,
}

impl FetchController {
    pub fn new(provider: Arc<dyn WeatherProvider>, mode: ForecastMode, limit: usize) -> Self {
        Self { provider, mode, limit }
    }

    pub fn from_config(provider: Arc<dyn WeatherProvider>, config: &Config) -> Self {
        Self::new(provider, config.forecast_mode, config.forecast_limit)
    }

    /// One fetch cycle. Both lookups must succeed; a half result is dropped.
    pub async fn fetch(&self, location: &LocationQuery) -> Result<WeatherSnapshot, WeatherError> {
        let (current, series) =
            tokio::try_join!(self.provider.current(location), self.provider.forecast(location))?;

        let upstream_len = series.len();
        let forecast = forecast::select(series, self.mode, self.limit);
        debug!(%location, upstream_len, kept = forecast.len(), "fetch cycle complete");

        Ok(WeatherSnapshot {
            location: location.clone(),
            units: self.provider.units(),
            current,
            forecast,
        })
    }

    /// Execute an effect and report its outcome as an action.
    pub async fn run(&self, effect: Effect) -> Action {
        let Effect::Fetch { request, location } = effect;

        match self.fetch(&location).await {
            Ok(snapshot) => {
                info!(request = request.get(), %location, place = %snapshot.current.place_name, "weather loaded");
                Action::FetchSucceeded { request, snapshot }
            }
            Err(err) => {
                warn!(request = request.get(), %location, error = %err, "weather fetch failed");
                Action::FetchFailed { request, message: err.message().to_string() }
            }
        }
    }

    /// Run an effect on its own task; the outcome is sent back on `actions`.
    pub fn spawn(&self, effect: Effect, actions: mpsc::UnboundedSender<Action>) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            let action = controller.run(effect).await;
            if actions.send(action).is_err() {
                debug!("session closed before fetch completed");
            }
        })
    }

    /// Submit `location` and wait for the cycle to finish, applying every transition to `state`.
    pub async fn request_weather(&self, state: &mut ViewState, location: LocationQuery) {
        let mut next = reduce(state, Action::Submit(location));
        while let Some(effect) = next {
            let outcome = self.run(effect).await;
            next = reduce(state, outcome);
        }
    }
}
