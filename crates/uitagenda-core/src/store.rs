//! The `EventStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `uitagenda-store-sqlite`). The reconciliation engine and the query API
//! depend on this abstraction, not on any concrete backend.
//!
//! A store is not required to be safe under concurrent writers from unrelated
//! callers. The scheduler guarantees at most one reconciliation pass mutates
//! the store at a time; reads may run alongside that pass and can observe a
//! partially applied batch.

use std::{collections::HashSet, future::Future};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  event::{EventRecord, NewEvent},
  query::EventQuery,
};

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Per-source counters reported by [`EventStore::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
  pub source:       String,
  pub active:       u64,
  /// Most recent `updated_at` among the source's active events.
  pub last_updated: Option<DateTime<Utc>>,
}

/// A summary of what the store currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
  pub total_active: u64,
  pub sources:      Vec<SourceStats>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an event store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `event`, or merge it into the existing row with the same
  /// `(title, date, source)` key.
  ///
  /// Returns the stored record and `true` if a new row was created. An
  /// existing row keeps its id and `created_at`, is reactivated and has its
  /// `updated_at` bumped.
  fn upsert(
    &self,
    event: NewEvent,
  ) -> impl Future<Output = Result<(EventRecord, bool), Self::Error>> + Send + '_;

  /// Deactivate every active event of `source` whose id is not in
  /// `keep_ids`. An empty keep set deactivates all of the source's events.
  ///
  /// Returns the number of rows deactivated by this call.
  fn deactivate_missing<'a>(
    &'a self,
    source: &'a str,
    keep_ids: &'a HashSet<i64>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Permanently delete every event created before `cutoff`, active or not.
  ///
  /// Returns the number of rows removed.
  fn purge_created_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Permanently delete every event whose `created_at` is more than
  /// `age_days` days in the past.
  fn purge_older_than(
    &self,
    age_days: u32,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_ {
    self.purge_created_before(Utc::now() - Duration::days(i64::from(age_days)))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve an event by id, active or not. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<EventRecord>, Self::Error>> + Send + '_;

  /// Active events matching `query`, ordered by `(date, time)` ascending.
  ///
  /// `time` is compared as raw text, so `"9:00"` sorts after `"10:00"`.
  fn query<'a>(
    &'a self,
    query: &'a EventQuery,
  ) -> impl Future<Output = Result<Vec<EventRecord>, Self::Error>> + Send + 'a;

  /// Distinct non-empty categories of active events, sorted, with the
  /// [`ALL_CATEGORIES`](crate::query::ALL_CATEGORIES) sentinel first.
  fn categories(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Number of inactive events currently held for `source`.
  fn count_inactive<'a>(
    &'a self,
    source: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Active-event counters, overall and per source.
  fn stats(&self) -> impl Future<Output = Result<StoreStats, Self::Error>> + Send + '_;
}
