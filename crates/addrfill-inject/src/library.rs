//! Autocomplete library seam.
//!
//! The third-party widget library is loaded at most once per page, on the
//! first overlay focus. A failed load is final for the page.

use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use addrfill_protocols::PlaceDetails;

use crate::dom::NodeId;
use crate::error::InjectError;

/// Restrictions passed to the widget on attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteOptions {
    pub types: Vec<String>,
    pub country: String,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            types: vec!["address".to_string()],
            country: "us".to_string(),
        }
    }
}

/// What a widget reports about the input it is bound to.
#[derive(Debug, Clone, Copy)]
pub enum WidgetEvent<'a> {
    /// The user picked a suggestion.
    PlaceChanged(&'a PlaceDetails),
    /// A prediction or details lookup failed.
    LookupFailed(&'a InjectError),
}

pub type WidgetHandler = Rc<dyn Fn(WidgetEvent<'_>)>;

/// A loaded widget library.
pub trait PlacesLibrary {
    /// Bind an autocomplete widget to `input`. `on_event` fires on every
    /// selection and every failed lookup.
    fn attach(
        &self,
        input: NodeId,
        options: &AutocompleteOptions,
        on_event: WidgetHandler,
    ) -> Result<(), InjectError>;
}

/// Loads the widget library into the page.
#[async_trait(?Send)]
pub trait LibrarySource {
    async fn load(&self) -> Result<Rc<dyn PlacesLibrary>, InjectError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
    Failed,
}

/// Page-wide, load-once handle on the library.
pub struct LibraryLoader {
    source: Rc<dyn LibrarySource>,
    library: OnceCell<Option<Rc<dyn PlacesLibrary>>>,
}

impl LibraryLoader {
    pub fn new(source: Rc<dyn LibrarySource>) -> Self {
        Self {
            source,
            library: OnceCell::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        match self.library.get() {
            None => LoadState::NotLoaded,
            Some(Some(_)) => LoadState::Loaded,
            Some(None) => LoadState::Failed,
        }
    }

    /// The library, loading it on first use. Concurrent callers share one
    /// load; `None` once a load has failed.
    pub async fn get(&self) -> Option<Rc<dyn PlacesLibrary>> {
        self.library
            .get_or_init(|| async {
                match self.source.load().await {
                    Ok(library) => {
                        info!("Autocomplete library loaded");
                        Some(library)
                    }
                    Err(e) => {
                        warn!("{}; address fields fall back to native typing", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct NullLibrary;

    impl PlacesLibrary for NullLibrary {
        fn attach(&self, _: NodeId, _: &AutocompleteOptions, _: WidgetHandler) -> Result<(), InjectError> {
            Ok(())
        }
    }

    struct CountingSource {
        loads: Cell<usize>,
        fail: bool,
    }

    #[async_trait(?Send)]
    impl LibrarySource for CountingSource {
        async fn load(&self) -> Result<Rc<dyn PlacesLibrary>, InjectError> {
            self.loads.set(self.loads.get() + 1);
            tokio::task::yield_now().await;
            if self.fail {
                Err(InjectError::LibraryLoad("script blocked".to_string()))
            } else {
                Ok(Rc::new(NullLibrary))
            }
        }
    }

    fn loader(fail: bool) -> (Rc<CountingSource>, LibraryLoader) {
        let source = Rc::new(CountingSource {
            loads: Cell::new(0),
            fail,
        });
        (source.clone(), LibraryLoader::new(source))
    }

    #[tokio::test]
    async fn test_loads_once() {
        let (source, loader) = loader(false);
        assert_eq!(loader.state(), LoadState::NotLoaded);

        let (a, b) = tokio::join!(loader.get(), loader.get());
        assert!(a.is_some() && b.is_some());
        assert!(loader.get().await.is_some());
        assert_eq!(source.loads.get(), 1);
        assert_eq!(loader.state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_failure_is_final() {
        let (source, loader) = loader(true);
        assert!(loader.get().await.is_none());
        assert!(loader.get().await.is_none());
        assert_eq!(source.loads.get(), 1);
        assert_eq!(loader.state(), LoadState::Failed);
    }

    #[test]
    fn test_default_options() {
        let options = AutocompleteOptions::default();
        assert_eq!(options.types, vec!["address"]);
        assert_eq!(options.country, "us");
    }
}
