//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that text comparison in SQL orders them
//! chronologically. Booleans are stored as `0`/`1`.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use uitagenda_core::event::EventRecord;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// The current time at the precision the store keeps, so records handed back
/// to callers compare equal to the same rows read later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Column list matching [`RawEvent::from_row`].
pub const EVENT_COLUMNS: &str = "id, title, date, source, description, time, location, address, \
   category, cost, organizer, image, source_url, created_at, updated_at, is_active";

/// Raw row as read from the `events` table before timestamp decoding.
#[derive(Debug)]
pub struct RawEvent {
  pub id:          i64,
  pub title:       String,
  pub date:        String,
  pub source:      String,
  pub description: Option<String>,
  pub time:        Option<String>,
  pub location:    Option<String>,
  pub address:     Option<String>,
  pub category:    Option<String>,
  pub cost:        Option<String>,
  pub organizer:   Option<String>,
  pub image:       Option<String>,
  pub source_url:  Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
  pub is_active:   bool,
}

impl RawEvent {
  /// Read a row selected with [`EVENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      date:        row.get(2)?,
      source:      row.get(3)?,
      description: row.get(4)?,
      time:        row.get(5)?,
      location:    row.get(6)?,
      address:     row.get(7)?,
      category:    row.get(8)?,
      cost:        row.get(9)?,
      organizer:   row.get(10)?,
      image:       row.get(11)?,
      source_url:  row.get(12)?,
      created_at:  row.get(13)?,
      updated_at:  row.get(14)?,
      is_active:   row.get(15)?,
    })
  }

  pub fn into_record(self) -> Result<EventRecord> {
    Ok(EventRecord {
      id:          self.id,
      title:       self.title,
      date:        self.date,
      source:      self.source,
      description: self.description,
      time:        self.time,
      location:    self.location,
      address:     self.address,
      category:    self.category,
      cost:        self.cost,
      organizer:   self.organizer,
      image:       self.image,
      source_url:  self.source_url,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      is_active:   self.is_active,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let early = Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::microseconds(1500);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(encode_dt(early), "2025-07-01T09:00:00.000000Z");
  }

  #[test]
  fn timestamp_roundtrip_at_store_precision() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }
}
