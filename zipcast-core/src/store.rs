//! View state and its transitions.
//!
//! `reduce` is the only place state changes. It never performs IO; when a
//! transition needs a fetch it returns an [`Effect`] for the controller to run.
//! Every fetch carries a [`RequestId`] and only the latest issued one may
//! land, so a slow response for an old submission cannot overwrite a newer one.

use tracing::debug;

use crate::model::{CurrentConditions, ForecastEntry, LocationQuery, Units, WeatherSnapshot};

/// Monotonically increasing identity of an issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Everything the renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    /// Transient error notification from the last failed fetch.
    pub notice: Option<String>,
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<ForecastEntry>,
    pub units: Units,
    pub show_details: bool,
    /// Last submitted location.
    pub location: LocationQuery,
    /// Location the displayed data was fetched for.
    loaded_location: Option<LocationQuery>,
    issued: u64,
    pending: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user submitted a location.
    Submit(LocationQuery),
    FetchSucceeded {
        request: RequestId,
        snapshot: WeatherSnapshot,
    },
    FetchFailed {
        request: RequestId,
        message: String,
    },
    ToggleDetails,
    DismissNotice,
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch {
        request: RequestId,
        location: LocationQuery,
    },
}

/// Which display variant the state calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Loading,
    Empty,
    Loaded,
}

impl ViewState {
    pub fn new(location: LocationQuery) -> Self {
        Self {
            loading: false,
            notice: None,
            current: None,
            forecast: Vec::new(),
            units: Units::default(),
            show_details: false,
            location,
            loaded_location: None,
            issued: 0,
            pending: None,
        }
    }

    /// Fresh state plus the fetch for the starting location.
    pub fn boot(location: LocationQuery) -> (Self, Effect) {
        let mut state = Self::new(location.clone());
        let effect = state.issue(location);
        (state, effect)
    }

    pub fn variant(&self) -> Variant {
        if self.loading {
            Variant::Loading
        } else if self.current.is_some() {
            Variant::Loaded
        } else {
            Variant::Empty
        }
    }

    /// Loaded data as one snapshot, if any has been loaded. Carries the
    /// location it was fetched for, not the last submitted one.
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        let location = self.loaded_location.as_ref()?;
        self.current.as_ref().map(|current| WeatherSnapshot {
            location: location.clone(),
            units: self.units,
            current: current.clone(),
            forecast: self.forecast.clone(),
        })
    }

    /// The request whose result is still awaited, if any.
    pub fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    /// Start a fetch cycle: new request id, loading on, notice cleared.
    fn issue(&mut self, location: LocationQuery) -> Effect {
        self.issued += 1;
        let request = RequestId(self.issued);
        self.pending = Some(request);
        self.loading = true;
        self.notice = None;
        self.location = location.clone();
        debug!(request = request.get(), %location, "fetch issued");
        Effect::Fetch { request, location }
    }

    fn accepts(&self, request: RequestId) -> bool {
        self.pending == Some(request)
    }
}

/// Apply one action. Returns the effect to run, if any.
pub fn reduce(state: &mut ViewState, action: Action) -> Option<Effect> {
    match action {
        Action::Submit(location) => Some(state.issue(location)),
        Action::FetchSucceeded { request, snapshot } => {
            if !state.accepts(request) {
                debug!(request = request.get(), "discarding stale fetch result");
                return None;
            }
            state.pending = None;
            state.loading = false;
            state.units = snapshot.units;
            state.loaded_location = Some(snapshot.location);
            state.current = Some(snapshot.current);
            state.forecast = snapshot.forecast;
            None
        }
        Action::FetchFailed { request, message } => {
            if !state.accepts(request) {
                debug!(request = request.get(), "discarding stale fetch failure");
                return None;
            }
            state.pending = None;
            state.loading = false;
            state.notice = Some(message);
            None
        }
        Action::ToggleDetails => {
            state.show_details = !state.show_details;
            None
        }
        Action::DismissNotice => {
            state.notice = None;
            None
        }
    }
}
