//! HTML source adapters for uitagenda.
//!
//! Each adapter fetches one listing page and turns it into [`RawRecord`]s
//! with CSS-selector and keyword heuristics. Extraction is deliberately
//! forgiving: a container that does not yield a title is dropped, and only a
//! failure to fetch the page is reported as a [`SourceError`].
//!
//! [`RawRecord`]: uitagenda_core::raw::RawRecord
//! [`SourceError`]: uitagenda_core::source::SourceError

use std::sync::Arc;

use uitagenda_core::source::SourceAdapter;

pub mod categorize;
pub mod dates;
pub mod eventbrite;
pub mod http;
pub mod iamsterdam;

mod extract;

pub use eventbrite::Eventbrite;
pub use iamsterdam::IAmsterdam;

/// Shown when a listing has no image of its own.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x250";

/// Both adapters in their fixed run order, sharing one HTTP client.
pub fn default_sources(client: reqwest::Client) -> Vec<Arc<dyn SourceAdapter>> {
  vec![
    Arc::new(IAmsterdam::new(client.clone())) as Arc<dyn SourceAdapter>,
    Arc::new(Eventbrite::new(client)),
  ]
}
