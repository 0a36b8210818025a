//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::{collections::HashSet, sync::Arc};

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode},
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uitagenda_core::{
  event::{EventRecord, NewEvent},
  query::EventQuery,
  store::{EventStore, StoreStats},
};
use uitagenda_store_sqlite::SqliteStore;
use uitagenda_sync::{Reconciler, ReconcilerConfig, Scheduler, SchedulerConfig};

use crate::{AppState, api_router};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn state_for<S: EventStore + 'static>(store: Arc<S>) -> AppState<S> {
  let reconciler = Arc::new(Reconciler::new(store, Vec::new(), ReconcilerConfig::default()));
  AppState::new(Scheduler::new(reconciler, SchedulerConfig::default()))
}

async fn state() -> AppState<SqliteStore> {
  state_for(Arc::new(SqliteStore::open_in_memory().await.unwrap()))
}

async fn seeded() -> AppState<SqliteStore> {
  let state = state().await;
  state.scheduler.seed().await.unwrap();
  state
}

async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
  let req = Request::builder()
    .method(method)
    .uri(uri)
    .body(Body::empty())
    .unwrap();
  let resp = router.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(state: &AppState<impl EventStore + 'static>, uri: &str) -> (StatusCode, Value) {
  send(api_router(state.clone()), Method::GET, uri).await
}

async fn post(state: &AppState<impl EventStore + 'static>, uri: &str) -> (StatusCode, Value) {
  send(api_router(state.clone()), Method::POST, uri).await
}

fn titles(body: &Value) -> Vec<&str> {
  let mut titles: Vec<&str> = body["events"]
    .as_array()
    .unwrap()
    .iter()
    .map(|e| e["title"].as_str().unwrap())
    .collect();
  titles.sort();
  titles
}

async fn id_of(state: &AppState<SqliteStore>, title: &str) -> i64 {
  let events = state.store.query(&EventQuery::default()).await.unwrap();
  events.iter().find(|e| e.title == title).unwrap().id
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_lists_nothing() {
  let state = state().await;
  let (status, body) = get(&state, "/events").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 0);
  assert_eq!(body["events"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn filters_by_search_and_category() {
  let state = seeded().await;

  let (_, body) = get(&state, "/events").await;
  assert_eq!(body["total"], 3);

  let (_, body) = get(&state, "/events?search=ROOFTOP").await;
  assert_eq!(titles(&body), ["Rooftop Open Mic Night"]);

  let (_, body) = get(&state, "/events?category=Community").await;
  assert_eq!(titles(&body), ["Community Lunch"]);

  let (_, body) = get(&state, "/events?category=All").await;
  assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn empty_parameters_are_ignored() {
  let state = seeded().await;
  let (status, body) = get(&state, "/events?search=&category=&date=").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn known_date_filters_are_accepted() {
  let state = seeded().await;
  for filter in ["today", "tomorrow", "this-week", "this-weekend"] {
    let (status, _) = get(&state, &format!("/events?date={filter}")).await;
    assert_eq!(status, StatusCode::OK, "{filter}");
  }
}

#[tokio::test]
async fn unknown_date_filter_is_a_bad_request() {
  let state = seeded().await;
  let (status, body) = get(&state, "/events?date=next-month").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("next-month"));
}

#[tokio::test]
async fn get_one_returns_active_event() {
  let state = seeded().await;
  let id = id_of(&state, "Community Lunch").await;

  let (status, body) = get(&state, &format!("/events/{id}")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["id"], id);
  assert_eq!(body["organizer"], "Equals Clubhouse");
  assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn missing_event_is_not_found() {
  let state = seeded().await;
  let (status, body) = get(&state, "/events/9999").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Event not found");
}

#[tokio::test]
async fn deactivated_events_are_hidden() {
  let state = seeded().await;
  let id = id_of(&state, "Rooftop Open Mic Night").await;
  state
    .store
    .deactivate_missing("Eventbrite", &HashSet::new())
    .await
    .unwrap();

  let (status, _) = get(&state, &format!("/events/{id}")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, body) = get(&state, "/events").await;
  assert_eq!(titles(&body), ["Free Exhibition: We are here - A shared past, Muslims tell"]);

  let (_, body) = get(&state, "/categories").await;
  assert_eq!(body["categories"], serde_json::json!(["All", "Art & Culture"]));
}

#[tokio::test]
async fn categories_start_with_all() {
  let state = seeded().await;
  let (status, body) = get(&state, "/categories").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body["categories"],
    serde_json::json!(["All", "Art & Culture", "Community", "Music"])
  );
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_counts_and_scheduler() {
  let state = seeded().await;
  let (status, body) = get(&state, "/health").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["active_events"], 3);
  assert_eq!(body["scheduler"]["state"], "uninitialized");
}

#[tokio::test]
async fn scheduler_status_includes_store_stats() {
  let state = seeded().await;
  let (status, body) = get(&state, "/scheduler/status").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["scheduler"]["state"], "uninitialized");
  assert_eq!(body["scheduler"]["jobs"], Value::Array(Vec::new()));
  assert_eq!(body["data"]["total_active"], 3);
  assert_eq!(body["data"]["sources"].as_array().unwrap().len(), 2);
}

// ─── Jobs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scrape_requires_a_running_scheduler() {
  let state = state().await;
  let (status, body) = post(&state, "/scrape").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["status"], "error");

  assert!(state.scheduler.start().await);
  let (status, body) = post(&state, "/scrape").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "success");
  assert_eq!(body["message"], "Manual scraping triggered");

  state.scheduler.shutdown().await;
}

#[tokio::test]
async fn seeding_twice_keeps_one_copy() {
  let state = state().await;
  for _ in 0..2 {
    let (status, body) = post(&state, "/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
  }
  let (_, body) = get(&state, "/events").await;
  assert_eq!(body["total"], 3);
}

// ─── Unreachable store ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("database is locked")]
struct Unreachable;

struct BrokenStore;

impl EventStore for BrokenStore {
  type Error = Unreachable;

  async fn upsert(&self, _event: NewEvent) -> Result<(EventRecord, bool), Unreachable> {
    Err(Unreachable)
  }

  async fn deactivate_missing(
    &self,
    _source: &str,
    _keep_ids: &HashSet<i64>,
  ) -> Result<u64, Unreachable> {
    Err(Unreachable)
  }

  async fn purge_created_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, Unreachable> {
    Err(Unreachable)
  }

  async fn get(&self, _id: i64) -> Result<Option<EventRecord>, Unreachable> { Err(Unreachable) }

  async fn query(&self, _query: &EventQuery) -> Result<Vec<EventRecord>, Unreachable> {
    Err(Unreachable)
  }

  async fn categories(&self) -> Result<Vec<String>, Unreachable> { Err(Unreachable) }

  async fn count_inactive(&self, _source: &str) -> Result<u64, Unreachable> { Err(Unreachable) }

  async fn stats(&self) -> Result<StoreStats, Unreachable> { Err(Unreachable) }
}

#[tokio::test]
async fn unreachable_store_is_unhealthy() {
  let state = state_for(Arc::new(BrokenStore));
  let (status, body) = get(&state, "/health").await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["status"], "unhealthy");
  assert_eq!(body["message"], "database is locked");
}

#[tokio::test]
async fn store_errors_surface_as_500() {
  let state = state_for(Arc::new(BrokenStore));
  let (status, body) = get(&state, "/events").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "database is locked");
}
