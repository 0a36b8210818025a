//! Runtime configuration, read from a TOML file layered with `UITAGENDA_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use uitagenda_sync::{ReconcilerConfig, SchedulerConfig};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  /// SQLite file; a leading `~/` is expanded.
  pub store_path:            PathBuf,
  pub interval_minutes:      u64,
  pub max_events_per_source: usize,
  pub fetch_timeout_secs:    u64,
  pub retention_days:        u32,
  pub start_scheduler:       bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_owned(),
      port:                  5000,
      store_path:            PathBuf::from("uitagenda.sqlite3"),
      interval_minutes:      20,
      max_events_per_source: 25,
      fetch_timeout_secs:    30,
      retention_days:        30,
      start_scheduler:       true,
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("UITAGENDA").try_parsing(true)),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn fetch_timeout(&self) -> Duration { Duration::from_secs(self.fetch_timeout_secs) }

  pub fn reconciler(&self) -> ReconcilerConfig {
    ReconcilerConfig {
      max_per_source: self.max_events_per_source,
      fetch_timeout:  self.fetch_timeout(),
      retention_days: self.retention_days,
    }
  }

  pub fn scheduler(&self) -> SchedulerConfig {
    SchedulerConfig {
      interval: Duration::from_secs(self.interval_minutes.max(1) * 60),
    }
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
