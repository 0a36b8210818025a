//! Test doubles: a decorating store with fault injection and concurrency
//! counters, and scripted source adapters.

use std::{
  collections::{HashSet, VecDeque},
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use uitagenda_core::{
  event::{EventRecord, NewEvent},
  query::EventQuery,
  raw::RawRecord,
  source::{BoxFuture, SourceAdapter, SourceError},
  store::{EventStore, StoreStats},
};
use uitagenda_store_sqlite::SqliteStore;

use crate::{
  Reconciler, ReconcilerConfig, Scheduler, SchedulerConfig, SchedulerState, SchedulerStatus,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn raw(title: &str, date: &str) -> RawRecord {
  RawRecord::new().with("title", title).with("date", date)
}

pub async fn sqlite() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

pub fn config() -> ReconcilerConfig {
  ReconcilerConfig {
    fetch_timeout: Duration::from_secs(5),
    ..ReconcilerConfig::default()
  }
}

pub fn reconciler<S: EventStore>(
  store: Arc<S>,
  sources: Vec<Arc<dyn SourceAdapter>>,
) -> Reconciler<S> {
  Reconciler::new(store, sources, config())
}

pub fn scheduler<S: EventStore + 'static>(
  store: Arc<S>,
  sources: Vec<Arc<dyn SourceAdapter>>,
) -> Scheduler<S> {
  Scheduler::new(Arc::new(reconciler(store, sources)), SchedulerConfig::default())
}

/// Wait until no pass is running or queued: idle, with only the recurring
/// job left in the table.
pub async fn wait_until_settled<S: EventStore + 'static>(
  scheduler: &Scheduler<S>,
) -> SchedulerStatus {
  tokio::time::timeout(Duration::from_secs(5), async {
    loop {
      let status = scheduler.status().await;
      if status.state == SchedulerState::Idle
        && status.jobs.len() == 1
        && status.jobs[0].id == "event_update_job"
      {
        return status;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
  })
  .await
  .expect("scheduler did not settle")
}

// ─── Store decorator ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum TestStoreError {
  #[error("injected failure: {0}")]
  Injected(String),

  #[error(transparent)]
  Sqlite(#[from] uitagenda_store_sqlite::Error),
}

/// Counters over the store-mutating calls.
#[derive(Debug, Default)]
pub struct Counters {
  in_flight:        AtomicUsize,
  max_in_flight:    AtomicUsize,
  upserts:          AtomicUsize,
  deactivate_calls: AtomicUsize,
}

impl Counters {
  fn enter(&self) -> InFlight<'_> {
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    InFlight(self)
  }

  pub fn max_in_flight(&self) -> usize { self.max_in_flight.load(Ordering::SeqCst) }

  pub fn upserts(&self) -> usize { self.upserts.load(Ordering::SeqCst) }

  pub fn deactivate_calls(&self) -> usize { self.deactivate_calls.load(Ordering::SeqCst) }
}

struct InFlight<'a>(&'a Counters);

impl Drop for InFlight<'_> {
  fn drop(&mut self) { self.0.in_flight.fetch_sub(1, Ordering::SeqCst); }
}

/// Wraps a [`SqliteStore`], optionally failing chosen operations and
/// slowing down mutations so overlapping passes would be observable.
pub struct TestStore {
  inner:        SqliteStore,
  fail_title:   Option<String>,
  fail_purge:   bool,
  delay:        Duration,
  pub counters: Counters,
}

impl TestStore {
  pub async fn new() -> Self {
    Self {
      inner:      SqliteStore::open_in_memory().await.expect("in-memory store"),
      fail_title: None,
      fail_purge: false,
      delay:      Duration::ZERO,
      counters:   Counters::default(),
    }
  }

  /// Reject every upsert of an event with this title.
  pub fn failing_title(mut self, title: &str) -> Self {
    self.fail_title = Some(title.to_owned());
    self
  }

  pub fn failing_purge(mut self) -> Self {
    self.fail_purge = true;
    self
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  async fn pause(&self) {
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
  }
}

impl EventStore for TestStore {
  type Error = TestStoreError;

  async fn upsert(&self, event: NewEvent) -> Result<(EventRecord, bool), TestStoreError> {
    let _in_flight = self.counters.enter();
    self.counters.upserts.fetch_add(1, Ordering::SeqCst);
    self.pause().await;
    if self.fail_title.as_deref() == Some(event.title.as_str()) {
      return Err(TestStoreError::Injected(format!("upsert of {:?}", event.title)));
    }
    Ok(self.inner.upsert(event).await?)
  }

  async fn deactivate_missing(
    &self,
    source: &str,
    keep_ids: &HashSet<i64>,
  ) -> Result<u64, TestStoreError> {
    let _in_flight = self.counters.enter();
    self.counters.deactivate_calls.fetch_add(1, Ordering::SeqCst);
    self.pause().await;
    Ok(self.inner.deactivate_missing(source, keep_ids).await?)
  }

  async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, TestStoreError> {
    let _in_flight = self.counters.enter();
    self.pause().await;
    if self.fail_purge {
      return Err(TestStoreError::Injected("purge".to_owned()));
    }
    Ok(self.inner.purge_created_before(cutoff).await?)
  }

  async fn get(&self, id: i64) -> Result<Option<EventRecord>, TestStoreError> {
    Ok(self.inner.get(id).await?)
  }

  async fn query(&self, query: &EventQuery) -> Result<Vec<EventRecord>, TestStoreError> {
    Ok(self.inner.query(query).await?)
  }

  async fn categories(&self) -> Result<Vec<String>, TestStoreError> {
    Ok(self.inner.categories().await?)
  }

  async fn count_inactive(&self, source: &str) -> Result<u64, TestStoreError> {
    Ok(self.inner.count_inactive(source).await?)
  }

  async fn stats(&self) -> Result<StoreStats, TestStoreError> { Ok(self.inner.stats().await?) }
}

// ─── Adapters ────────────────────────────────────────────────────────────────

/// Returns queued batches in order; the last batch repeats forever.
pub struct ScriptedAdapter {
  name:    String,
  batches: Mutex<VecDeque<Vec<RawRecord>>>,
  calls:   AtomicUsize,
}

impl ScriptedAdapter {
  pub fn new(name: &str, batches: Vec<Vec<RawRecord>>) -> Arc<Self> {
    Arc::new(Self {
      name:    name.to_owned(),
      batches: Mutex::new(batches.into()),
      calls:   AtomicUsize::new(0),
    })
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl SourceAdapter for ScriptedAdapter {
  fn name(&self) -> &str { &self.name }

  fn fetch(&self, max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let mut batches = self.batches.lock().unwrap();
    let batch = if batches.len() > 1 {
      batches.pop_front().unwrap_or_default()
    } else {
      batches.front().cloned().unwrap_or_default()
    };
    let batch: Vec<RawRecord> = batch.into_iter().take(max_count).collect();
    Box::pin(async move { Ok::<_, SourceError>(batch) })
  }
}

/// Always fails with a transport error.
pub struct FailingAdapter(pub &'static str);

impl SourceAdapter for FailingAdapter {
  fn name(&self) -> &str { self.0 }

  fn fetch(&self, _max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    Box::pin(async {
      Err::<Vec<RawRecord>, _>(SourceError::Transport("connection refused".to_owned()))
    })
  }
}

/// Never answers.
pub struct StalledAdapter(pub &'static str);

impl SourceAdapter for StalledAdapter {
  fn name(&self) -> &str { self.0 }

  fn fetch(&self, _max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    Box::pin(std::future::pending::<Result<Vec<RawRecord>, SourceError>>())
  }
}

/// Panics inside the fetch future.
pub struct PanickingAdapter(pub &'static str);

impl SourceAdapter for PanickingAdapter {
  fn name(&self) -> &str { self.0 }

  fn fetch(&self, _max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    Box::pin(async {
      let records: Option<Vec<RawRecord>> = None;
      Ok(records.expect("adapter blew up"))
    })
  }
}

/// Signals `entered` when a fetch starts, then blocks until `release` is
/// notified before returning its batch.
pub struct GatedAdapter {
  name:        &'static str,
  batch:       Vec<RawRecord>,
  pub entered: Notify,
  pub release: Notify,
}

impl GatedAdapter {
  pub fn new() -> Arc<Self> { Self::named("Gated", vec![raw("Gated event", "2025-07-10")]) }

  pub fn named(name: &'static str, batch: Vec<RawRecord>) -> Arc<Self> {
    Arc::new(Self {
      name,
      batch,
      entered: Notify::new(),
      release: Notify::new(),
    })
  }
}

impl SourceAdapter for GatedAdapter {
  fn name(&self) -> &str { self.name }

  fn fetch(&self, _max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    Box::pin(async move {
      self.entered.notify_one();
      self.release.notified().await;
      Ok::<_, SourceError>(self.batch.clone())
    })
  }
}
