//! Error type for `uitagenda-sync`.

use thiserror::Error;
use uitagenda_core::source::SourceError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("source error: {0}")]
  Source(#[from] SourceError),

  #[error("adapter panicked: {0}")]
  AdapterPanicked(String),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
