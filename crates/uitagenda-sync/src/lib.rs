//! Reconciliation engine and scheduler for uitagenda.
//!
//! [`Reconciler`] turns one source's scrape batch into store mutations and
//! aggregates per-source outcomes into a [`ReconcileReport`]. [`Scheduler`]
//! drives it on a fixed interval and on demand, guaranteeing that at most one
//! reconciliation pass mutates the store at any time.

pub mod engine;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod seed;

pub use engine::{Reconciler, ReconcilerConfig};
pub use error::{Error, Result};
pub use report::{CleanupOutcome, ReconcileReport, SourceOutcome, SourceReport, SourceRun};
pub use scheduler::{JobInfo, Scheduler, SchedulerConfig, SchedulerState, SchedulerStatus};

#[cfg(test)]
mod tests;
