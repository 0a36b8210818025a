//! JSON query API for uitagenda.
//!
//! Exposes an axum [`Router`] over any [`EventStore`] plus the [`Scheduler`]
//! that keeps it fresh. Reads go straight to the store and may observe a
//! reconciliation pass that is still in flight.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", uitagenda_api::api_router(AppState::new(scheduler)))
//! ```

pub mod error;
pub mod events;
pub mod jobs;
pub mod status;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use uitagenda_core::store::EventStore;
use uitagenda_sync::Scheduler;

pub use error::ApiError;

/// Shared handler state.
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub scheduler: Scheduler<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      scheduler: self.scheduler.clone(),
    }
  }
}

impl<S: EventStore + 'static> AppState<S> {
  /// State reading from the same store the scheduler reconciles into.
  pub fn new(scheduler: Scheduler<S>) -> Self {
    Self {
      store: scheduler.reconciler().store().clone(),
      scheduler,
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: EventStore + 'static,
{
  Router::new()
    // Events
    .route("/events", get(events::list::<S>))
    .route("/events/{id}", get(events::get_one::<S>))
    .route("/categories", get(events::categories::<S>))
    // Status
    .route("/health", get(status::health::<S>))
    .route("/scheduler/status", get(status::scheduler::<S>))
    // Jobs
    .route("/scrape", post(jobs::scrape::<S>))
    .route("/seed", post(jobs::seed::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
