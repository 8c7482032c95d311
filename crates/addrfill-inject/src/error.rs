//! Injection errors.

use thiserror::Error;

use addrfill_protocols::ErrorKind;

use crate::selector::SelectorError;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Invalid field rule: {0}")]
    Selector(#[from] SelectorError),

    /// The autocomplete library could not be loaded on this page.
    #[error("Autocomplete library failed to load: {0}")]
    LibraryLoad(String),

    /// The loaded library refused to bind to a field.
    #[error("Autocomplete attach failed: {0}")]
    Attach(String),

    /// A lookup made by an attached widget failed.
    #[error("Address lookup failed: {0}")]
    Lookup(String),
}

impl InjectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Selector(_) | Self::Attach(_) => ErrorKind::InternalError,
            Self::LibraryLoad(_) | Self::Lookup(_) => ErrorKind::UpstreamError,
        }
    }
}
