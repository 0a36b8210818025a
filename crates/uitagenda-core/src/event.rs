//! Event types: the canonical record kept by the store.
//!
//! An event is identified by its natural key `(title, date, source)`. The
//! store assigns a numeric surrogate id on first insert; every later upsert
//! with the same key merges into that row instead of creating a new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The composite natural key of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
  pub title:  String,
  /// `YYYY-MM-DD`.
  pub date:   String,
  pub source: String,
}

// ─── Canonical input ─────────────────────────────────────────────────────────

/// A validated, store-ready event produced by the normalizer.
///
/// Optional fields that are `None` were not provided by the source; on an
/// update they leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
  pub title:       String,
  pub date:        String,
  pub source:      String,
  pub description: Option<String>,
  /// Free text, e.g. `"19:00 - 21:00"` or `"All day"`.
  pub time:        Option<String>,
  pub location:    Option<String>,
  pub address:     Option<String>,
  pub category:    Option<String>,
  pub cost:        Option<String>,
  pub organizer:   Option<String>,
  /// Image URL.
  pub image:       Option<String>,
  /// Link back to the listing on the originating site.
  pub source_url:  Option<String>,
}

impl NewEvent {
  /// Construct an event with only the identity fields set.
  pub fn new(
    title: impl Into<String>,
    date: impl Into<String>,
    source: impl Into<String>,
  ) -> Self {
    Self {
      title: title.into(),
      date: date.into(),
      source: source.into(),
      ..Self::default()
    }
  }

  pub fn key(&self) -> EventKey {
    EventKey {
      title:  self.title.clone(),
      date:   self.date.clone(),
      source: self.source.clone(),
    }
  }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// An event as persisted by an [`EventStore`](crate::store::EventStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
  /// Store-assigned surrogate id; never changes once assigned.
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
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  /// Inactive events are hidden from every query-facing read.
  pub is_active:   bool,
}

impl EventRecord {
  /// Build a freshly inserted record from `new` with the given surrogate id.
  pub fn from_new(id: i64, new: NewEvent, now: DateTime<Utc>) -> Self {
    Self {
      id,
      title: new.title,
      date: new.date,
      source: new.source,
      description: new.description,
      time: new.time,
      location: new.location,
      address: new.address,
      category: new.category,
      cost: new.cost,
      organizer: new.organizer,
      image: new.image,
      source_url: new.source_url,
      created_at: now,
      updated_at: now,
      is_active: true,
    }
  }

  pub fn key(&self) -> EventKey {
    EventKey {
      title:  self.title.clone(),
      date:   self.date.clone(),
      source: self.source.clone(),
    }
  }

  /// Merge a re-scraped version of this event into the record.
  ///
  /// Every field the update provides overwrites the stored value; fields it
  /// leaves as `None` are kept. The identity fields, `id` and `created_at` are
  /// never touched. The record is reactivated and `updated_at` is bumped to
  /// `now` (clamped so it never precedes `created_at`).
  pub fn merge(&mut self, update: NewEvent, now: DateTime<Utc>) {
    debug_assert_eq!(self.key(), update.key(), "merge across different keys");

    let NewEvent {
      title: _,
      date: _,
      source: _,
      description,
      time,
      location,
      address,
      category,
      cost,
      organizer,
      image,
      source_url,
    } = update;

    overwrite(&mut self.description, description);
    overwrite(&mut self.time, time);
    overwrite(&mut self.location, location);
    overwrite(&mut self.address, address);
    overwrite(&mut self.category, category);
    overwrite(&mut self.cost, cost);
    overwrite(&mut self.organizer, organizer);
    overwrite(&mut self.image, image);
    overwrite(&mut self.source_url, source_url);

    self.is_active = true;
    self.updated_at = now.max(self.created_at);
  }
}

fn overwrite(slot: &mut Option<String>, value: Option<String>) {
  if value.is_some() {
    *slot = value;
  }
}
