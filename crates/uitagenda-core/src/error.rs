//! Error types for `uitagenda-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown date filter: {0:?}")]
  UnknownDateFilter(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
