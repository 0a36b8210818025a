//! The `SourceAdapter` trait implemented by each harvested website.
//!
//! Adapters are held as `Arc<dyn SourceAdapter>` in a fixed, ordered list, so
//! the trait returns boxed futures to stay object-safe.

use std::{future::Future, pin::Pin, time::Duration};

use thiserror::Error;

use crate::raw::RawRecord;

/// A boxed, `Send` future borrowing from the adapter.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A whole-batch failure of one source. Per-record extraction problems never
/// surface here; the adapter drops those records itself.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("transport error: {0}")]
  Transport(String),

  #[error("unexpected HTTP status {status} from {url}")]
  Status { status: u16, url: String },

  #[error("fetch timed out after {0:?}")]
  Timeout(Duration),

  #[error("unreadable response: {0}")]
  Body(String),
}

/// Produces raw candidate records for one source on demand.
pub trait SourceAdapter: Send + Sync {
  /// The registered source name stamped on every event from this adapter
  /// (e.g. `"I amsterdam"`).
  fn name(&self) -> &str;

  /// Fetch up to `max_count` candidates.
  ///
  /// "No results" is an empty vector, not an error. Only genuine transport
  /// failures are returned as `Err`.
  fn fetch(
    &self,
    max_count: usize,
  ) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>>;
}
