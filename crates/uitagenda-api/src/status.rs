//! Health and scheduler status endpoints.

use axum::{Json, extract::State};
use serde::Serialize;
use uitagenda_core::store::{EventStore, StoreStats};
use uitagenda_sync::SchedulerStatus;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:        &'static str,
  pub message:       &'static str,
  pub active_events: u64,
  pub scheduler:     SchedulerStatus,
}

/// `GET /health`
///
/// Unhealthy (503) only when the store itself cannot answer. A scheduler
/// that is stopped or whose last pass had errors is still healthy.
pub async fn health<S>(State(state): State<AppState<S>>) -> Result<Json<Health>, ApiError>
where
  S: EventStore + 'static,
{
  let stats = state.store.stats().await.map_err(|e| {
    tracing::error!(error = %e, "health check failed");
    ApiError::Unavailable(e.to_string())
  })?;

  Ok(Json(Health {
    status:        "healthy",
    message:       "Amsterdam Events API is running",
    active_events: stats.total_active,
    scheduler:     state.scheduler.status().await,
  }))
}

#[derive(Debug, Serialize)]
pub struct SchedulerReport {
  pub scheduler: SchedulerStatus,
  pub data:      StoreStats,
}

/// `GET /scheduler/status`
pub async fn scheduler<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<SchedulerReport>, ApiError>
where
  S: EventStore + 'static,
{
  let scheduler = state.scheduler.status().await;
  let data = state.store.stats().await.map_err(ApiError::store)?;
  Ok(Json(SchedulerReport { scheduler, data }))
}
