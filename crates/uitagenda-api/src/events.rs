//! Handlers for the read-only event endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Optional `?search=&category=&date=` |
//! | `GET`  | `/events/{id}` | 404 if missing or inactive |
//! | `GET`  | `/categories` | `"All"` first |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uitagenda_core::{
  event::EventRecord,
  query::{DateFilter, EventQuery},
  store::EventStore,
};

use crate::{AppState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// Empty values are treated as absent.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub search:   Option<String>,
  /// Exact category, or `All`.
  pub category: Option<String>,
  /// `today`, `tomorrow`, `this-week` or `this-weekend`.
  pub date:     Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventList {
  pub events: Vec<EventRecord>,
  pub total:  usize,
}

fn non_empty(value: Option<String>) -> Option<String> { value.filter(|v| !v.trim().is_empty()) }

/// `GET /events[?search=...][&category=...][&date=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<EventList>, ApiError>
where
  S: EventStore + 'static,
{
  let date_filter = non_empty(params.date)
    .map(|d| d.parse::<DateFilter>())
    .transpose()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let query = EventQuery {
    search: non_empty(params.search),
    category: non_empty(params.category),
    date_filter,
    today: None,
  };

  let events = state.store.query(&query).await.map_err(ApiError::store)?;
  Ok(Json(EventList {
    total: events.len(),
    events,
  }))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /events/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<EventRecord>, ApiError>
where
  S: EventStore + 'static,
{
  let event = state
    .store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .filter(|e| e.is_active)
    .ok_or_else(|| ApiError::NotFound("Event not found".to_owned()))?;
  Ok(Json(event))
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoryList {
  pub categories: Vec<String>,
}

/// `GET /categories`
pub async fn categories<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<CategoryList>, ApiError>
where
  S: EventStore + 'static,
{
  let categories = state.store.categories().await.map_err(ApiError::store)?;
  Ok(Json(CategoryList { categories }))
}
