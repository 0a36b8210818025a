//! Normalization of raw candidates into canonical [`NewEvent`]s.
//!
//! Only the identity fields are required: a non-empty title and a date in
//! `YYYY-MM-DD` shape. The date is checked for shape only, never for being a
//! real calendar day; downstream code treats it as an opaque sortable string.

use thiserror::Error;

use crate::{event::NewEvent, raw::RawRecord};

/// Keys the normalizer understands. Anything else on a [`RawRecord`] is
/// ignored.
pub const KNOWN_FIELDS: &[&str] = &[
  "title",
  "date",
  "source",
  "description",
  "time",
  "location",
  "address",
  "category",
  "cost",
  "organizer",
  "image",
  "source_url",
];

/// Why a candidate was dropped. Rejections are counted as skipped, never
/// reported as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("missing title")]
  MissingTitle,

  #[error("missing date")]
  MissingDate,

  #[error("date {0:?} is not in YYYY-MM-DD form")]
  MalformedDate(String),
}

/// Shape `raw` into a canonical event for `source`.
///
/// The event's source is always the registered adapter name, whatever the raw
/// record claims. Values are whitespace-trimmed and blank values count as
/// absent.
pub fn normalize(source: &str, raw: &RawRecord) -> Result<NewEvent, Rejection> {
  let title = field(raw, "title").ok_or(Rejection::MissingTitle)?;
  let date = field(raw, "date").ok_or(Rejection::MissingDate)?;
  if !is_iso_date_shaped(&date) {
    return Err(Rejection::MalformedDate(date));
  }

  for key in raw.keys().filter(|k| !KNOWN_FIELDS.contains(k)) {
    tracing::debug!(%source, key, "ignoring unknown raw field");
  }

  Ok(NewEvent {
    title,
    date,
    source: source.to_owned(),
    description: field(raw, "description"),
    time: field(raw, "time"),
    location: field(raw, "location"),
    address: field(raw, "address"),
    category: field(raw, "category"),
    cost: field(raw, "cost"),
    organizer: field(raw, "organizer"),
    image: field(raw, "image"),
    source_url: field(raw, "source_url"),
  })
}

/// `true` if `s` looks like `YYYY-MM-DD` (ASCII digits, dashes at 4 and 7).
pub fn is_iso_date_shaped(s: &str) -> bool {
  let b = s.as_bytes();
  b.len() == 10
    && b.iter().enumerate().all(|(i, c)| match i {
      4 | 7 => *c == b'-',
      _ => c.is_ascii_digit(),
    })
}

fn field(raw: &RawRecord, key: &str) -> Option<String> {
  raw
    .get(key)
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_owned)
}
