//! Endpoints that start work: manual reconciliation and sample seeding.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use uitagenda_core::store::EventStore;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Ack {
  pub status:  &'static str,
  pub message: String,
}

impl Ack {
  fn success(message: impl Into<String>) -> Self {
    Self { status: "success", message: message.into() }
  }
}

/// `POST /scrape`
///
/// Queues a pass and returns immediately. Fails with 500 when the scheduler
/// is not running.
pub async fn scrape<S>(State(state): State<AppState<S>>) -> (StatusCode, Json<Ack>)
where
  S: EventStore + 'static,
{
  if state.scheduler.trigger_manual().await {
    (StatusCode::OK, Json(Ack::success("Manual scraping triggered")))
  } else {
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(Ack {
        status:  "error",
        message: "Failed to trigger manual scraping".to_owned(),
      }),
    )
  }
}

/// `POST /seed`
///
/// Waits for any pass in progress before writing.
pub async fn seed<S>(State(state): State<AppState<S>>) -> Result<Json<Ack>, ApiError>
where
  S: EventStore + 'static,
{
  let count = state.scheduler.seed().await.map_err(ApiError::store)?;
  Ok(Json(Ack::success(format!("Seeded {count} sample events"))))
}
