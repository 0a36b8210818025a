//! [`Reconciler`] merges scrape batches into an [`EventStore`].
//!
//! Failure containment is layered: a bad record never aborts its batch, a
//! failed source never prevents the other sources from running, and a failed
//! purge never undoes what the sources wrote.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::Utc;
use uitagenda_core::{
  normalize::normalize,
  raw::RawRecord,
  source::{SourceAdapter, SourceError},
  store::EventStore,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  report::{CleanupOutcome, ReconcileReport, SourceOutcome, SourceReport, SourceRun},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
  /// `max_count` passed to every adapter's `fetch`.
  pub max_per_source: usize,
  /// Upper bound on one adapter fetch.
  pub fetch_timeout:  Duration,
  /// Events created longer ago than this are purged after every run.
  pub retention_days: u32,
}

impl Default for ReconcilerConfig {
  fn default() -> Self {
    Self {
      max_per_source: 25,
      fetch_timeout:  Duration::from_secs(30),
      retention_days: 30,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Reconciles registered sources against a store.
///
/// Holds no state between calls beyond its configuration; each pass keeps
/// its keep set locally.
pub struct Reconciler<S> {
  store:   Arc<S>,
  sources: Vec<Arc<dyn SourceAdapter>>,
  config:  ReconcilerConfig,
}

impl<S: EventStore> Reconciler<S> {
  /// Sources run in the order given here.
  pub fn new(
    store: Arc<S>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: ReconcilerConfig,
  ) -> Self {
    Self { store, sources, config }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> &ReconcilerConfig { &self.config }

  pub fn source_names(&self) -> Vec<&str> {
    self.sources.iter().map(|s| s.name()).collect()
  }

  /// Merge one source's batch into the store.
  ///
  /// Every candidate is normalized and upserted independently; rejections
  /// and store failures are counted as skipped. Afterwards every active event
  /// of the source that was not touched is deactivated, even when the batch
  /// was empty or nothing could be stored.
  ///
  /// Only a failure of the deactivation step itself (or of the follow-up
  /// inactive count) is returned as an error.
  #[tracing::instrument(skip_all, fields(source = %source_name))]
  pub async fn reconcile(
    &self,
    source_name: &str,
    candidates: Vec<RawRecord>,
  ) -> Result<SourceReport> {
    let scraped = candidates.len();
    let mut keep_ids = HashSet::with_capacity(scraped);
    let mut processed = 0;
    let mut skipped = 0;

    for (index, raw) in candidates.iter().enumerate() {
      let event = match normalize(source_name, raw) {
        Ok(event) => event,
        Err(reason) => {
          tracing::warn!(index, %reason, "skipping candidate");
          skipped += 1;
          continue;
        }
      };

      let title = event.title.clone();
      match self.store.upsert(event).await {
        Ok((record, created)) => {
          tracing::debug!(id = record.id, %title, created, "upserted event");
          keep_ids.insert(record.id);
          processed += 1;
        }
        Err(e) => {
          tracing::error!(index, %title, error = %e, "failed to store event");
          skipped += 1;
        }
      }
    }

    let newly_inactive = self
      .store
      .deactivate_missing(source_name, &keep_ids)
      .await
      .map_err(Error::store)?;

    let deactivated = self
      .store
      .count_inactive(source_name)
      .await
      .map_err(Error::store)?;

    let report = SourceReport {
      scraped,
      processed,
      skipped,
      deactivated,
      last_updated: Utc::now(),
    };
    tracing::info!(
      scraped,
      processed,
      skipped,
      newly_inactive,
      deactivated,
      "source reconciled"
    );
    Ok(report)
  }

  /// Fetch and reconcile one adapter, bounded by the fetch timeout.
  ///
  /// The fetch runs on its own task so a panicking adapter fails only its
  /// own source.
  async fn update_source(&self, adapter: &Arc<dyn SourceAdapter>) -> Result<SourceReport> {
    let timeout = self.config.fetch_timeout;
    let max_count = self.config.max_per_source;
    let mut fetch = tokio::spawn({
      let adapter = adapter.clone();
      async move { adapter.fetch(max_count).await }
    });

    let candidates = match tokio::time::timeout(timeout, &mut fetch).await {
      Ok(Ok(fetched)) => fetched?,
      Ok(Err(e)) => return Err(Error::AdapterPanicked(e.to_string())),
      Err(_) => {
        fetch.abort();
        return Err(SourceError::Timeout(timeout).into());
      }
    };

    tracing::info!(source = adapter.name(), candidates = candidates.len(), "fetched candidates");
    self.reconcile(adapter.name(), candidates).await
  }

  /// Run every registered source in order, then purge expired events.
  ///
  /// Never fails: per-source and cleanup errors are recorded in the report.
  #[tracing::instrument(skip_all, fields(run_id = tracing::field::Empty))]
  pub async fn update_all_sources(&self) -> ReconcileReport {
    let run_id = Uuid::new_v4();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));
    tracing::info!(sources = self.sources.len(), "starting event update");

    let mut runs = Vec::with_capacity(self.sources.len());
    let mut errors = Vec::new();

    for adapter in &self.sources {
      let name = adapter.name().to_owned();
      let outcome = match self.update_source(adapter).await {
        Ok(report) => SourceOutcome::Completed(report),
        Err(e) => {
          let message = format!("Error updating {name} events: {e}");
          tracing::error!(source = %name, error = %e, "source update failed");
          errors.push(message.clone());
          SourceOutcome::Failed { error: message }
        }
      };
      runs.push(SourceRun { source: name, outcome });
    }

    let cleanup = match self.cleanup().await {
      Ok(purged) => CleanupOutcome::Completed { purged },
      Err(e) => {
        let message = format!("Error during cleanup: {e}");
        tracing::error!(error = %e, "cleanup failed");
        errors.push(message.clone());
        CleanupOutcome::Failed(message)
      }
    };

    let total_processed = runs.iter().map(|run| run.outcome.processed()).sum();
    if errors.is_empty() {
      tracing::info!(total_processed, "event update completed");
    } else {
      tracing::warn!(total_processed, errors = errors.len(), "event update completed with errors");
    }

    ReconcileReport {
      run_id,
      timestamp: Utc::now(),
      sources: runs,
      total_processed,
      errors,
      cleanup,
    }
  }

  async fn cleanup(&self) -> Result<u64> {
    let purged = self
      .store
      .purge_older_than(self.config.retention_days)
      .await
      .map_err(Error::store)?;
    tracing::info!(purged, retention_days = self.config.retention_days, "purged old events");
    Ok(purged)
  }
}
