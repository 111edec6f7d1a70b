//! Drives a [`SearchSession`] against real collaborators.
//!
//! The controller owns the session and runs each location request and search
//! to completion on the caller's task. View events (`select_category`,
//! `retry`) map one-to-one onto methods here.

use std::sync::Arc;

use tracing::debug;

use crate::location_resolver::LocationProvider;
use crate::models::CuisineCategory;
use crate::search::RestaurantSearchClient;
use crate::session::{RetryAction, SearchSession, SearchTicket, SessionView};

type Observer = Box<dyn FnMut(&SessionView<'_>) + Send>;

pub struct SearchController<P: LocationProvider> {
    session: SearchSession,
    client: Arc<RestaurantSearchClient>,
    provider: P,
    observer: Option<Observer>,
}

impl<P: LocationProvider> SearchController<P> {
    pub fn new(client: Arc<RestaurantSearchClient>, provider: P, category: CuisineCategory) -> Self {
        Self {
            session: SearchSession::new(category),
            client,
            provider,
            observer: None,
        }
    }

    /// Called with the current view after every state change
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&SessionView<'_>) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[must_use]
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Acquire the location and run the initial search
    pub async fn start(&mut self) {
        self.notify();
        self.locate().await;
    }

    pub async fn select_category(&mut self, category: CuisineCategory) {
        if let Some(ticket) = self.session.select_category(category) {
            self.run_search(ticket).await;
        }
    }

    pub async fn retry(&mut self) {
        match self.session.retry() {
            RetryAction::Search(ticket) => self.run_search(ticket).await,
            RetryAction::Locate => {
                self.notify();
                self.locate().await;
            }
        }
    }

    async fn locate(&mut self) {
        match self.provider.current_position().await {
            Ok(location) => {
                if let Some(ticket) = self.session.location_acquired(location) {
                    self.run_search(ticket).await;
                }
            }
            Err(err) => {
                self.session.location_failed(&err);
                self.notify();
            }
        }
    }

    async fn run_search(&mut self, ticket: SearchTicket) {
        self.notify();
        let outcome = self
            .client
            .search(&ticket.location, ticket.category.as_str())
            .await;
        if !self.session.complete_search(&ticket, outcome) {
            debug!("Search #{} was superseded", ticket.sequence);
        }
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.session.view());
        }
    }
}
