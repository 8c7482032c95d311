//! Input debouncing with request generations.
//!
//! Each keystroke cancels the pending timer. A dispatched lookup is never
//! cancelled; instead it carries a [`Ticket`] whose generation is compared
//! against the latest one when the answer arrives.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Identifies one dispatched query.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer input has arrived since this query was issued.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

pub struct QueryDebouncer {
    delay: Duration,
    min_len: usize,
    latest: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl QueryDebouncer {
    pub fn new(delay: Duration, min_len: usize) -> Self {
        Self {
            delay,
            min_len,
            latest: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Feed the current input text.
    ///
    /// Returns `false` when the trimmed text is too short to look up; the
    /// caller should clear its results. Otherwise `run` is invoked with the
    /// trimmed query once the input has been quiet for the delay.
    pub fn on_input<F, Fut>(&mut self, text: &str, run: F) -> bool
    where
        F: FnOnce(String, Ticket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        // Any input, even a too-short one, makes earlier answers stale.
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;

        let query = text.trim();
        if query.chars().count() < self.min_len {
            return false;
        }

        let ticket = Ticket {
            generation,
            latest: Arc::clone(&self.latest),
        };
        let query = query.to_string();
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later keystroke cannot abort the lookup itself.
            tokio::spawn(run(query, ticket));
        }));
        true
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
