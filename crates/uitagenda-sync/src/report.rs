//! Structured outcomes of reconciliation passes.
//!
//! A [`ReconcileReport`] is always produced, even when every source failed;
//! failures are enumerated in `errors` and in the per-source entries.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

// ─── Per source ──────────────────────────────────────────────────────────────

/// Counters for one source's reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
  /// Number of raw candidates handed to the engine.
  pub scraped:      usize,
  /// Successful upserts.
  pub processed:    usize,
  /// Candidates dropped by validation plus upserts the store rejected.
  pub skipped:      usize,
  /// Inactive rows held for the source after deactivation. A snapshot, not
  /// the number deactivated by this pass.
  pub deactivated:  u64,
  pub last_updated: DateTime<Utc>,
}

/// What happened to one source during a full update.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SourceOutcome {
  Completed(SourceReport),
  Failed { error: String },
}

impl SourceOutcome {
  pub fn processed(&self) -> usize {
    match self {
      Self::Completed(r) => r.processed,
      Self::Failed { .. } => 0,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRun {
  pub source:  String,
  #[serde(flatten)]
  pub outcome: SourceOutcome,
}

// ─── Cleanup ─────────────────────────────────────────────────────────────────

/// Result of the global retention purge.
///
/// Serialises as the string `"completed"` or as the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
  Completed { purged: u64 },
  Failed(String),
}

impl Serialize for CleanupOutcome {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Completed { .. } => serializer.serialize_str("completed"),
      Self::Failed(message) => serializer.serialize_str(message),
    }
  }
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// The outcome of one `update_all_sources` run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
  pub run_id:          Uuid,
  pub timestamp:       DateTime<Utc>,
  /// In registration order.
  pub sources:         Vec<SourceRun>,
  pub total_processed: usize,
  pub errors:          Vec<String>,
  pub cleanup:         CleanupOutcome,
}

impl ReconcileReport {
  pub fn source(&self, name: &str) -> Option<&SourceOutcome> {
    self
      .sources
      .iter()
      .find(|run| run.source == name)
      .map(|run| &run.outcome)
  }

  pub fn is_clean(&self) -> bool { self.errors.is_empty() }
}
