//! UI-facing search session state machine
//!
//! `Locating → Idle → Searching → Success | Error`, with category changes and
//! retries re-entering `Searching`. Every search is tagged with a sequence
//! number; only the completion of the most recently issued search is applied.

use std::fmt::Display;

use tracing::{debug, error, info, warn};

use crate::error::{LOCATION_UNAVAILABLE_MESSAGE, LOCATION_UNSUPPORTED_MESSAGE, SEARCH_FAILED_MESSAGE};
use crate::models::{CuisineCategory, GeoLocation, Restaurant};
use crate::{FoodGuideError, Result};

/// Transitions kept in [`SearchSession::history`]
pub const HISTORY_LIMIT: usize = 64;

/// Which view is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingState {
    Locating,
    Idle,
    Searching,
    Success,
    Error,
}

impl Display for LoadingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoadingState::Locating => "locating",
            LoadingState::Idle => "idle",
            LoadingState::Searching => "searching",
            LoadingState::Success => "success",
            LoadingState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Why the session is in the error state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFailure {
    LocationUnsupported,
    LocationUnavailable,
    Search,
}

impl SessionFailure {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            SessionFailure::LocationUnsupported => LOCATION_UNSUPPORTED_MESSAGE,
            SessionFailure::LocationUnavailable => LOCATION_UNAVAILABLE_MESSAGE,
            SessionFailure::Search => SEARCH_FAILED_MESSAGE,
        }
    }

    #[must_use]
    pub fn is_location(&self) -> bool {
        !matches!(self, SessionFailure::Search)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    Locating,
    Idle,
    Searching,
    Success { restaurants: Vec<Restaurant> },
    Error { failure: SessionFailure },
}

impl SessionState {
    fn loading_state(&self) -> LoadingState {
        match self {
            SessionState::Locating => LoadingState::Locating,
            SessionState::Idle => LoadingState::Idle,
            SessionState::Searching => LoadingState::Searching,
            SessionState::Success { .. } => LoadingState::Success,
            SessionState::Error { .. } => LoadingState::Error,
        }
    }
}

/// A search the caller must run and report back through
/// [`SearchSession::complete_search`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub sequence: u64,
    pub location: GeoLocation,
    pub category: CuisineCategory,
}

/// What a retry asks the caller to do
#[derive(Debug, Clone, PartialEq)]
pub enum RetryAction {
    Search(SearchTicket),
    Locate,
}

/// Everything the view layer needs to render one frame
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView<'a> {
    pub loading_state: LoadingState,
    pub restaurants: &'a [Restaurant],
    pub category: CuisineCategory,
    pub error_message: Option<&'static str>,
    pub failure: Option<SessionFailure>,
    pub location: Option<GeoLocation>,
    /// Category buttons are disabled while locating or searching
    pub controls_enabled: bool,
}

/// Owns the session state; transition methods are the only way to change it
#[derive(Debug)]
pub struct SearchSession {
    state: SessionState,
    location: Option<GeoLocation>,
    category: CuisineCategory,
    issued: u64,
    history: Vec<LoadingState>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(CuisineCategory::default())
    }
}

impl SearchSession {
    pub fn new(category: CuisineCategory) -> Self {
        Self {
            state: SessionState::Locating,
            location: None,
            category,
            issued: 0,
            history: vec![LoadingState::Locating],
        }
    }

    #[must_use]
    pub fn loading_state(&self) -> LoadingState {
        self.state.loading_state()
    }

    #[must_use]
    pub fn location(&self) -> Option<GeoLocation> {
        self.location
    }

    #[must_use]
    pub fn category(&self) -> CuisineCategory {
        self.category
    }

    /// Results of the last applied search; empty outside `Success`
    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        match &self.state {
            SessionState::Success { restaurants } => restaurants,
            _ => &[],
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<SessionFailure> {
        match self.state {
            SessionState::Error { failure } => Some(failure),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.failure().map(|failure| failure.message())
    }

    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        !matches!(self.state, SessionState::Locating | SessionState::Searching)
    }

    /// The most recent loading states entered, oldest first, at most
    /// [`HISTORY_LIMIT`] of them
    #[must_use]
    pub fn history(&self) -> &[LoadingState] {
        &self.history
    }

    #[must_use]
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            loading_state: self.loading_state(),
            restaurants: self.restaurants(),
            category: self.category,
            error_message: self.error_message(),
            failure: self.failure(),
            location: self.location,
            controls_enabled: self.controls_enabled(),
        }
    }

    /// The position arrived. Moves to `Idle` and immediately starts the first
    /// search with the selected category.
    pub fn location_acquired(&mut self, location: GeoLocation) -> Option<SearchTicket> {
        if self.state != SessionState::Locating {
            warn!("Ignoring location update while {}", self.loading_state());
            return None;
        }

        info!("Location acquired: {}", location.format_coordinates());
        self.location = Some(location);
        self.transition(SessionState::Idle);
        Some(self.begin_search(location))
    }

    /// The position could not be obtained
    pub fn location_failed(&mut self, err: &FoodGuideError) {
        if self.state != SessionState::Locating {
            warn!("Ignoring location failure while {}: {}", self.loading_state(), err);
            return;
        }

        error!("Location acquisition failed: {}", err);
        let failure = match err {
            FoodGuideError::LocationUnsupported { .. } => SessionFailure::LocationUnsupported,
            _ => SessionFailure::LocationUnavailable,
        };
        self.transition(SessionState::Error { failure });
    }

    /// User picked a category. Re-selecting the current one does nothing.
    pub fn select_category(&mut self, category: CuisineCategory) -> Option<SearchTicket> {
        if category == self.category {
            debug!("Category {} already selected", category);
            return None;
        }

        self.category = category;
        let location = self.location?;
        Some(self.begin_search(location))
    }

    /// User asked to try again: search again if we know where we are,
    /// otherwise go back to locating.
    pub fn retry(&mut self) -> RetryAction {
        if let Some(location) = self.location {
            RetryAction::Search(self.begin_search(location))
        } else {
            info!("Retrying location acquisition");
            self.transition(SessionState::Locating);
            RetryAction::Locate
        }
    }

    /// Apply the outcome of a search. Returns `false` when the ticket has been
    /// superseded by a newer search and the outcome was dropped.
    pub fn complete_search(&mut self, ticket: &SearchTicket, outcome: Result<Vec<Restaurant>>) -> bool {
        if ticket.sequence != self.issued || self.state != SessionState::Searching {
            debug!(
                "Discarding outcome of search #{} (latest is #{})",
                ticket.sequence, self.issued
            );
            return false;
        }

        match outcome {
            Ok(restaurants) => {
                info!(
                    "Search #{} for {} returned {} restaurants",
                    ticket.sequence,
                    ticket.category,
                    restaurants.len()
                );
                self.transition(SessionState::Success { restaurants });
            }
            Err(err) => {
                error!("Search #{} for {} failed: {}", ticket.sequence, ticket.category, err);
                self.transition(SessionState::Error {
                    failure: SessionFailure::Search,
                });
            }
        }
        true
    }

    fn begin_search(&mut self, location: GeoLocation) -> SearchTicket {
        self.issued += 1;
        let ticket = SearchTicket {
            sequence: self.issued,
            location,
            category: self.category,
        };
        debug!("Starting search #{} for {}", ticket.sequence, ticket.category);
        self.transition(SessionState::Searching);
        ticket
    }

    fn transition(&mut self, next: SessionState) {
        let from = self.loading_state();
        let to = next.loading_state();
        debug!("Session {} -> {}", from, to);
        self.state = next;
        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(to);
    }
}
