//! Interactive session: one state owner, fetches on background tasks.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    sync::mpsc,
};
use tracing::debug;
use zipcast_core::{
    Action, Config, FetchController, LocationQuery, Renderer, ViewState, WeatherProvider, reduce,
};

const HELP: &str = "Enter a postal code to look it up.\n\
                    Commands: details (d, more) toggle extra fields, dismiss clear the error, \
                    help (?), quit (q, exit).\n\
                    Command words are never sent as postal codes.";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Nothing,
    Submit(LocationQuery),
    Details,
    Dismiss,
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let Some(location) = LocationQuery::parse(line) else {
            return Input::Nothing;
        };

        match location.as_str().to_lowercase().as_str() {
            "q" | "quit" | "exit" => Input::Quit,
            "d" | "details" | "more" => Input::Details,
            "dismiss" => Input::Dismiss,
            "?" | "help" => Input::Help,
            _ => Input::Submit(location),
        }
    }
}

struct Session<Tz: chrono::TimeZone> {
    controller: FetchController,
    renderer: Renderer<Tz>,
    actions: mpsc::UnboundedSender<Action>,
    outcomes: mpsc::UnboundedReceiver<Action>,
    state: ViewState,
}

impl<Tz> Session<Tz>
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    /// Boot the state for `location` and start its fetch.
    fn start(controller: FetchController, renderer: Renderer<Tz>, location: LocationQuery) -> Self {
        let (actions, outcomes) = mpsc::unbounded_channel();
        let (state, effect) = ViewState::boot(location);
        controller.spawn(effect, actions.clone());

        Self { controller, renderer, actions, outcomes, state }
    }

    /// Reduce, run any effect in the background, redraw if something changed.
    fn dispatch(&mut self, action: Action) {
        let before = self.state.clone();

        if let Some(effect) = reduce(&mut self.state, action) {
            self.controller.spawn(effect, self.actions.clone());
        }

        if self.state != before {
            self.draw();
        } else {
            debug!("state unchanged, skipping redraw");
        }
    }

    fn draw(&self) {
        println!();
        println!("{}", self.renderer.render(&self.state));
    }

    /// Read commands until quit. When input ends, wait for the pending fetch
    /// to land before returning.
    async fn drive<R>(mut self, mut lines: Lines<R>) -> Result<ViewState>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut input_open = true;

        loop {
            if !input_open && self.state.pending().is_none() {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => {
                    let Some(line) = line.context("Failed to read from stdin")? else {
                        debug!("input closed, waiting for pending fetch");
                        input_open = false;
                        continue;
                    };
                    let action = match Input::parse(&line) {
                        Input::Nothing => continue,
                        Input::Quit => break,
                        Input::Help => {
                            println!("{HELP}");
                            continue;
                        }
                        Input::Details => Action::ToggleDetails,
                        Input::Dismiss => Action::DismissNotice,
                        Input::Submit(location) => Action::Submit(location),
                    };
                    self.dispatch(action);
                }
                Some(action) = self.outcomes.recv() => self.dispatch(action),
                else => break,
            }
        }

        Ok(self.state)
    }
}

pub async fn run(config: &Config, provider: Arc<dyn WeatherProvider>) -> Result<()> {
    let session = Session::start(
        FetchController::from_config(provider, config),
        Renderer::local(config),
        config.default_location_query()?,
    );

    println!("{HELP}");
    session.draw();

    let lines = BufReader::new(tokio::io::stdin()).lines();
    session.drive(lines).await?;

    Ok(())
}
