use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use zipcast_core::{
    Config, FetchController, LocationQuery, Renderer, Units, Variant, ViewState,
    provider_from_config,
};

use crate::session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "zipcast", version, about = "Weather by postal code")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a session: show the default location, then read postal codes from stdin.
    Interactive,

    /// Fetch and print weather once.
    Show {
        /// Postal code; the configured default when absent.
        location: Option<String>,

        /// Include wind, humidity, pressure, sunrise and sunset.
        #[arg(long)]
        details: bool,

        /// Print the loaded data as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Store API key and defaults in the config file.
    Configure,

    /// Print the config file location.
    ConfigPath,
}

fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl Cli {
    /// `RUST_LOG` wins over `-v` when set.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(self.verbose)));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    pub async fn run(self) -> Result<ExitCode> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Interactive => {
                let config = Config::resolve()?;
                let provider = provider_from_config(&config)?;
                session::run(&config, provider).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { location, details, json } => show(location, details, json).await,
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(location: Option<String>, details: bool, json: bool) -> Result<ExitCode> {
    let config = Config::resolve()?;
    let provider = provider_from_config(&config)?;
    let controller = FetchController::from_config(provider, &config);

    let location = match location {
        Some(raw) => LocationQuery::parse(&raw).context("Postal code must not be empty")?,
        None => config.default_location_query()?,
    };

    let mut state = ViewState::new(location.clone());
    state.show_details = details;
    controller.request_weather(&mut state, location).await;

    let report = Report::build(&state, json, &Renderer::local(&config))?;
    if let Some(out) = &report.stdout {
        println!("{out}");
    }
    if let Some(err) = &report.stderr {
        eprintln!("{err}");
    }

    Ok(if report.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// What `show` prints, and whether it counts as success.
#[derive(Debug)]
struct Report {
    stdout: Option<String>,
    stderr: Option<String>,
    success: bool,
}

impl Report {
    fn build<Tz>(state: &ViewState, json: bool, renderer: &Renderer<Tz>) -> Result<Self>
    where
        Tz: chrono::TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let success = state.variant() == Variant::Loaded && state.notice.is_none();

        if !json {
            return Ok(Self { stdout: Some(renderer.render(state)), stderr: None, success });
        }

        match state.snapshot() {
            Some(snapshot) => Ok(Self {
                stdout: Some(serde_json::to_string_pretty(&snapshot)?),
                stderr: state.notice.as_deref().map(|notice| format!("Error: {notice}")),
                success,
            }),
            None => Ok(Self {
                stdout: None,
                stderr: Some(format!("Error: {}", state.notice.as_deref().unwrap_or_default())),
                success,
            }),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Stored in the config file; ZIPCAST_API_KEY overrides it")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let default_location = Text::new("Default postal code:")
        .with_default(&config.default_location)
        .prompt()
        .context("Failed to read default postal code")?;
    config.default_location = default_location.trim().to_string();

    let country = Text::new("Country code for forecasts:")
        .with_default(&config.country)
        .prompt()
        .context("Failed to read country code")?;
    config.country = country.trim().to_lowercase();

    let units = Select::new("Units:", vec!["metric", "imperial", "standard"])
        .with_starting_cursor(match config.units {
            Units::Metric => 0,
            Units::Imperial => 1,
            Units::Standard => 2,
        })
        .prompt()
        .context("Failed to read units")?;
    config.units = Units::try_from(units)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["zipcast"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn show_accepts_location_and_flags() {
        let cli = Cli::try_parse_from(["zipcast", "-vv", "show", "90210", "--details", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Show { location, details, json }) => {
                assert_eq!(location.as_deref(), Some("90210"));
                assert!(details);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn utc_renderer() -> Renderer<chrono::Utc> {
        Renderer::new(chrono::Utc, "7-Day Forecast".into())
    }

    #[test]
    fn json_report_for_failed_fetch_goes_to_stderr() {
        let location = LocationQuery::parse("00000").unwrap();
        let (mut state, effect) = ViewState::boot(location);
        let zipcast_core::Effect::Fetch { request, .. } = effect;
        zipcast_core::reduce(
            &mut state,
            zipcast_core::Action::FetchFailed { request, message: "city not found".into() },
        );

        let report = Report::build(&state, true, &utc_renderer()).unwrap();
        assert!(report.stdout.is_none());
        assert_eq!(report.stderr.as_deref(), Some("Error: city not found"));
        assert!(!report.success);

        // state is still usable after building the report
        assert_eq!(state.notice.as_deref(), Some("city not found"));
    }

    #[test]
    fn text_report_for_empty_state_fails() {
        let state = ViewState::new(LocationQuery::parse("10001").unwrap());
        let report = Report::build(&state, false, &utc_renderer()).unwrap();
        assert!(report.stdout.is_some());
        assert!(!report.success);
    }

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(1), "info");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(9), "trace");
    }
}
