//! [`Scheduler`] drives the reconciler on a fixed interval and on demand.
//!
//! Every pass, whether fired by the recurring ticker, by the initial one-off
//! job, by a manual trigger or by [`Scheduler::run_now`], acquires the same
//! run lock before touching the store. Manual triggers are accepted while a
//! pass is in flight; they queue on the lock and run afterwards.
//!
//! The scheduler is an ordinary value. Build one per process and share it by
//! cloning; clones drive the same job table.

use std::{
  collections::BTreeMap,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
  sync::{Mutex, watch},
  time::{Instant, MissedTickBehavior},
};
use uitagenda_core::store::EventStore;
use uuid::Uuid;

use crate::{Reconciler, ReconcileReport, Result, seed};

const RECURRING_JOB_ID: &str = "event_update_job";
const INITIAL_JOB_ID: &str = "initial_update";
/// Shortest accepted recurring period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

// ─── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
  /// Period of the recurring update job. Clamped to at least one second.
  pub interval: Duration,
}

impl Default for SchedulerConfig {
  fn default() -> Self { Self { interval: Duration::from_secs(20 * 60) } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
  /// Not started, or shut down.
  Uninitialized,
  /// Started, no pass in progress.
  Idle,
  /// A reconciliation pass is in progress.
  Running,
}

/// One entry of the job table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInfo {
  pub id:            String,
  pub name:          String,
  pub next_run_time: Option<DateTime<Utc>>,
  /// E.g. `interval[0:20:00]` or `date[2025-07-02 10:00:00 UTC]`.
  pub trigger:       String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
  pub state:       SchedulerState,
  pub jobs:        Vec<JobInfo>,
  pub last_report: Option<ReconcileReport>,
}

// ─── Internals ───────────────────────────────────────────────────────────────

enum Lifecycle {
  Uninitialized,
  Started { shutdown: watch::Sender<bool> },
  Stopped,
}

/// What fired a pass.
enum Trigger {
  Recurring,
  /// A one-off job registered in the job table under this id.
  OneOff(String),
  /// A direct call that bypasses the job table.
  Direct,
}

struct Inner<S> {
  reconciler:  Arc<Reconciler<S>>,
  config:      SchedulerConfig,
  /// The single mutual-exclusion domain for store-mutating passes.
  run_lock:    Mutex<()>,
  running:     AtomicBool,
  lifecycle:   Mutex<Lifecycle>,
  jobs:        Mutex<BTreeMap<String, JobInfo>>,
  last_report: Mutex<Option<ReconcileReport>>,
}

impl<S> Inner<S> {
  async fn is_started(&self) -> bool {
    matches!(*self.lifecycle.lock().await, Lifecycle::Started { .. })
  }
}

fn after(period: Duration) -> Option<DateTime<Utc>> {
  chrono::Duration::from_std(period)
    .ok()
    .and_then(|d| Utc::now().checked_add_signed(d))
}

fn interval_trigger(period: Duration) -> String {
  let secs = period.as_secs();
  format!("interval[{}:{:02}:{:02}]", secs / 3600, secs / 60 % 60, secs % 60)
}

fn date_trigger(at: DateTime<Utc>) -> String {
  format!("date[{}]", at.format("%Y-%m-%d %H:%M:%S UTC"))
}

fn one_off(id: &str, name: &str) -> JobInfo {
  let now = Utc::now();
  JobInfo {
    id:            id.to_owned(),
    name:          name.to_owned(),
    next_run_time: Some(now),
    trigger:       date_trigger(now),
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

pub struct Scheduler<S> {
  inner: Arc<Inner<S>>,
}

impl<S> Clone for Scheduler<S> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<S: EventStore + 'static> Scheduler<S> {
  pub fn new(reconciler: Arc<Reconciler<S>>, mut config: SchedulerConfig) -> Self {
    if config.interval < MIN_INTERVAL {
      tracing::warn!(interval = ?config.interval, min = ?MIN_INTERVAL, "interval too short, clamping");
      config.interval = MIN_INTERVAL;
    }
    Self {
      inner: Arc::new(Inner {
        reconciler,
        config,
        run_lock: Mutex::new(()),
        running: AtomicBool::new(false),
        lifecycle: Mutex::new(Lifecycle::Uninitialized),
        jobs: Mutex::new(BTreeMap::new()),
        last_report: Mutex::new(None),
      }),
    }
  }

  pub fn reconciler(&self) -> &Arc<Reconciler<S>> { &self.inner.reconciler }

  /// Register the recurring job and fire one immediate pass.
  ///
  /// Returns `false` if the scheduler is already started. A scheduler that
  /// was shut down may be started again.
  pub async fn start(&self) -> bool {
    let mut lifecycle = self.inner.lifecycle.lock().await;
    if matches!(*lifecycle, Lifecycle::Started { .. }) {
      tracing::warn!("scheduler already started");
      return false;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    *lifecycle = Lifecycle::Started { shutdown: shutdown_tx };

    let period = self.inner.config.interval;
    {
      let mut jobs = self.inner.jobs.lock().await;
      jobs.insert(RECURRING_JOB_ID.to_owned(), JobInfo {
        id:            RECURRING_JOB_ID.to_owned(),
        name:          "Update events".to_owned(),
        next_run_time: after(period),
        trigger:       interval_trigger(period),
      });
      jobs.insert(
        INITIAL_JOB_ID.to_owned(),
        one_off(INITIAL_JOB_ID, "Initial event update"),
      );
    }
    drop(lifecycle);

    tokio::spawn(tick_loop(self.inner.clone(), shutdown_rx));
    tokio::spawn(run_pass(
      self.inner.clone(),
      Trigger::OneOff(INITIAL_JOB_ID.to_owned()),
    ));

    tracing::info!(interval = ?period, "scheduler started");
    true
  }

  /// Queue a one-off pass.
  ///
  /// Returns `true` once the request is accepted, not once it completes.
  /// Rejected when the scheduler is not started.
  pub async fn trigger_manual(&self) -> bool {
    let lifecycle = self.inner.lifecycle.lock().await;
    if !matches!(*lifecycle, Lifecycle::Started { .. }) {
      tracing::warn!("manual update rejected, scheduler not running");
      return false;
    }

    let id = format!("manual_update_{}", Uuid::new_v4().simple());
    self
      .inner
      .jobs
      .lock()
      .await
      .insert(id.clone(), one_off(&id, "Manual event update"));
    drop(lifecycle);

    tokio::spawn(run_pass(self.inner.clone(), Trigger::OneOff(id.clone())));
    tracing::info!(job_id = %id, "manual event update triggered");
    true
  }

  /// Run one pass right away under the run lock, whether or not the
  /// scheduler is started. `None` if the pass panicked.
  pub async fn run_now(&self) -> Option<ReconcileReport> {
    run_pass(self.inner.clone(), Trigger::Direct).await
  }

  /// Upsert the sample events under the run lock, so a seed never lands in
  /// the middle of a pass.
  pub async fn seed(&self) -> Result<usize> {
    let _guard = self.inner.run_lock.lock().await;
    seed::seed_sample_data(self.inner.reconciler.store().as_ref()).await
  }

  pub async fn status(&self) -> SchedulerStatus {
    // Jobs before `running`: a pass flags itself running before it removes
    // its one-off job entry.
    let jobs: Vec<JobInfo> = self.inner.jobs.lock().await.values().cloned().collect();
    let running = self.inner.running.load(Ordering::SeqCst);

    let state = if running {
      SchedulerState::Running
    } else if self.inner.is_started().await {
      SchedulerState::Idle
    } else {
      SchedulerState::Uninitialized
    };

    SchedulerStatus {
      state,
      jobs,
      last_report: self.inner.last_report.lock().await.clone(),
    }
  }

  pub async fn last_report(&self) -> Option<ReconcileReport> {
    self.inner.last_report.lock().await.clone()
  }

  /// Cancel future fires. An in-flight pass runs to completion; queued
  /// one-off passes are dropped. Safe to call repeatedly or before `start`.
  pub async fn shutdown(&self) {
    let mut lifecycle = self.inner.lifecycle.lock().await;
    match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
      Lifecycle::Started { shutdown } => {
        let _ = shutdown.send(true);
        self.inner.jobs.lock().await.clear();
        tracing::info!("scheduler stopped");
      }
      previous => {
        *lifecycle = previous;
        tracing::debug!("scheduler not running, nothing to stop");
      }
    }
  }
}

// ─── Tasks ───────────────────────────────────────────────────────────────────

/// Fires the recurring job. The pass is awaited inline, so at most one
/// recurring instance exists at a time; ticks missed meanwhile are skipped.
async fn tick_loop<S: EventStore + 'static>(
  inner: Arc<Inner<S>>,
  mut shutdown: watch::Receiver<bool>,
) {
  let period = inner.config.interval;
  let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
  ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

  loop {
    tokio::select! {
      _ = ticks.tick() => {}
      changed = shutdown.changed() => {
        if changed.is_err() || *shutdown.borrow() {
          break;
        }
        continue;
      }
    }

    if let Some(job) = inner.jobs.lock().await.get_mut(RECURRING_JOB_ID) {
      job.next_run_time = after(period);
    }

    let started = Instant::now();
    run_pass(inner.clone(), Trigger::Recurring).await;
    if started.elapsed() > period {
      tracing::warn!(elapsed = ?started.elapsed(), "pass overran the interval, skipping missed ticks");
    }
  }

  tracing::debug!("recurring update job stopped");
}

async fn run_pass<S: EventStore + 'static>(
  inner: Arc<Inner<S>>,
  trigger: Trigger,
) -> Option<ReconcileReport> {
  let _guard = inner.run_lock.lock().await;

  if !matches!(trigger, Trigger::Direct) && !inner.is_started().await {
    if let Trigger::OneOff(id) = &trigger {
      inner.jobs.lock().await.remove(id);
    }
    tracing::debug!("scheduler stopped, skipping queued pass");
    return None;
  }

  inner.running.store(true, Ordering::SeqCst);
  if let Trigger::OneOff(id) = &trigger {
    inner.jobs.lock().await.remove(id);
  }

  let reconciler = inner.reconciler.clone();
  let report = match tokio::spawn(async move { reconciler.update_all_sources().await }).await {
    Ok(report) => {
      if report.is_clean() {
        tracing::info!(total_processed = report.total_processed, "event update finished");
      } else {
        tracing::warn!(
          total_processed = report.total_processed,
          errors = report.errors.len(),
          "event update finished with errors"
        );
      }
      *inner.last_report.lock().await = Some(report.clone());
      Some(report)
    }
    Err(e) => {
      tracing::error!(error = %e, "event update pass failed");
      None
    }
  };

  inner.running.store(false, Ordering::SeqCst);
  report
}
