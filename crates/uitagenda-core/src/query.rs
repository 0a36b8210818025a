//! Read-side query types: [`EventQuery`] and the relative [`DateFilter`].

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The category sentinel meaning "no category filter". Always the first entry
/// of [`EventStore::categories`](crate::store::EventStore::categories).
pub const ALL_CATEGORIES: &str = "All";

// ─── Date filter ─────────────────────────────────────────────────────────────

/// A relative date window, resolved against a reference day at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilter {
  Today,
  Tomorrow,
  /// Today through today + 7 days, inclusive.
  ThisWeek,
  /// The coming Saturday and Sunday. On a Sunday this is the *next* weekend.
  ThisWeekend,
}

/// An inclusive range of `YYYY-MM-DD` strings.
///
/// Comparing the stored date column lexicographically against these bounds is
/// correct because the format is fixed-width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
  pub start: String,
  pub end:   String,
}

impl DateRange {
  fn between(start: NaiveDate, end: NaiveDate) -> Self {
    Self { start: fmt_date(start), end: fmt_date(end) }
  }

  pub fn contains(&self, date: &str) -> bool {
    self.start.as_str() <= date && date <= self.end.as_str()
  }
}

impl DateFilter {
  /// Resolve the filter against `today`.
  pub fn resolve(self, today: NaiveDate) -> DateRange {
    match self {
      Self::Today => DateRange::between(today, today),
      Self::Tomorrow => {
        let tomorrow = add_days(today, 1);
        DateRange::between(tomorrow, tomorrow)
      }
      Self::ThisWeek => DateRange::between(today, add_days(today, 7)),
      Self::ThisWeekend => {
        let weekday = u64::from(today.weekday().num_days_from_monday());
        let saturday = add_days(today, (5 + 7 - weekday) % 7);
        DateRange::between(saturday, add_days(saturday, 1))
      }
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Today => "today",
      Self::Tomorrow => "tomorrow",
      Self::ThisWeek => "this-week",
      Self::ThisWeekend => "this-weekend",
    }
  }
}

impl fmt::Display for DateFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DateFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "today" => Ok(Self::Today),
      "tomorrow" => Ok(Self::Tomorrow),
      "this-week" => Ok(Self::ThisWeek),
      "this-weekend" => Ok(Self::ThisWeekend),
      other => Err(Error::UnknownDateFilter(other.to_owned())),
    }
  }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
  date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn fmt_date(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`EventStore::query`](crate::store::EventStore::query).
///
/// Only active events are ever returned.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Case-insensitive substring match over title, description and location.
  pub search:      Option<String>,
  /// Exact category match; [`ALL_CATEGORIES`] means no filter.
  pub category:    Option<String>,
  pub date_filter: Option<DateFilter>,
  /// Reference day for `date_filter`; defaults to the local current date.
  pub today:       Option<NaiveDate>,
}

impl EventQuery {
  /// The category to filter on, with the "All" sentinel and blanks removed.
  pub fn effective_category(&self) -> Option<&str> {
    self
      .category
      .as_deref()
      .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
  }

  /// The search term, with blanks removed.
  pub fn effective_search(&self) -> Option<&str> {
    self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }

  /// Resolve `date_filter` against `today` (or the local current date).
  pub fn date_range(&self) -> Option<DateRange> {
    let today = self
      .today
      .unwrap_or_else(|| chrono::Local::now().date_naive());
    self.date_filter.map(|f| f.resolve(today))
  }
}
