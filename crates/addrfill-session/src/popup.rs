//! Popup address input.
//!
//! Turns raw keystrokes into debounced prediction lookups through the
//! [`MessageRouter`] and publishes what should be displayed. Answers to
//! superseded queries are dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use addrfill_config::ClientConfig;
use addrfill_protocols::{PlaceDetails, Prediction};

use crate::debounce::QueryDebouncer;
use crate::error::SessionError;
use crate::router::{MessageRouter, Request, Response};

/// What the popup should show.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEvent {
    Cleared,
    Predictions(Vec<Prediction>),
    Error(String),
}

pub struct AddressInput {
    router: Arc<MessageRouter>,
    debouncer: QueryDebouncer,
    events: mpsc::UnboundedSender<SuggestionEvent>,
}

impl AddressInput {
    pub fn new(
        router: Arc<MessageRouter>,
        config: &ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let input = Self {
            router,
            debouncer: QueryDebouncer::new(config.debounce(), config.min_query_len),
            events,
        };
        (input, rx)
    }

    /// Feed the current text of the input.
    pub fn on_input(&mut self, text: &str) {
        let router = Arc::clone(&self.router);
        let events = self.events.clone();

        let scheduled = self.debouncer.on_input(text, move |query, ticket| async move {
            let response = router.handle(Request::GetPlacePredictions { query }).await;
            if !ticket.is_current() {
                debug!(generation = ticket.generation(), "Dropping stale predictions");
                return;
            }

            let event = match response {
                Response::Predictions { predictions } => SuggestionEvent::Predictions(predictions),
                Response::Error { error } => SuggestionEvent::Error(error),
                other => SuggestionEvent::Error(format!("Unexpected response: {:?}", other)),
            };
            let _ = events.send(event);
        });

        if !scheduled {
            let _ = self.events.send(SuggestionEvent::Cleared);
        }
    }

    /// Resolve the prediction the user picked.
    pub async fn select(&self, prediction: &Prediction) -> Result<PlaceDetails, SessionError> {
        let request = Request::GetPlaceDetails {
            place_id: prediction.place_id.clone(),
        };
        match self.router.handle(request).await {
            Response::Place { place } => Ok(place),
            Response::Error { error } => Err(SessionError::Upstream(error)),
            other => Err(SessionError::Internal(format!("Unexpected response: {:?}", other))),
        }
    }
}
