//! Date and time heuristics for free-text listing dates.
//!
//! Listing pages print dates in many shapes (`15 July 2025`,
//! `Monday, July 15, 2025`, `15/07/2025`, `2025-07-15`). The first
//! recognisable calendar date wins; text without one falls back to a fixed
//! number of days after `today`, so upcoming listings without a machine
//! readable date still appear.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use uitagenda_core::normalize::is_iso_date_shaped;

pub const ALL_DAY: &str = "All day";

/// A listing's date and time as stored on a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct When {
  /// `YYYY-MM-DD`.
  pub date: String,
  pub time: Option<String>,
}

/// Interpret free text, falling back to `today + fallback_days` when no
/// date is found. The time is `"All day"` when the text carries no clock.
pub fn parse_when(text: &str, today: NaiveDate, fallback_days: u64) -> When {
  let date = find_date(text)
    .or_else(|| today.checked_add_days(Days::new(fallback_days)))
    .unwrap_or(today);
  When {
    date: date.format("%Y-%m-%d").to_string(),
    time: Some(find_time(text).unwrap_or_else(|| ALL_DAY.to_owned())),
  }
}

/// Parse a machine-readable timestamp such as a `<time datetime>` attribute
/// or a schema.org `startDate`. The wall-clock time of the given offset is
/// kept. Date-only input has no time.
pub fn parse_iso(s: &str) -> Option<When> {
  let s = s.trim();
  let at = |dt: NaiveDateTime| When {
    date: dt.format("%Y-%m-%d").to_string(),
    time: Some(dt.format("%H:%M").to_string()),
  };

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(at(dt.naive_local()));
  }
  for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
      return Some(at(dt));
    }
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(|d| When {
    date: d.format("%Y-%m-%d").to_string(),
    time: None,
  })
}

// ─── Dates ───────────────────────────────────────────────────────────────────

fn tokens(text: &str) -> Vec<&str> {
  text
    .split(|c: char| c.is_whitespace() || c == ',')
    .map(|t| t.trim_matches(|c: char| c == '.' || c == '(' || c == ')'))
    .filter(|t| !t.is_empty())
    .collect()
}

fn month(token: &str) -> Option<u32> {
  let m = match token.to_lowercase().as_str() {
    "january" | "jan" => 1,
    "february" | "feb" => 2,
    "march" | "mar" => 3,
    "april" | "apr" => 4,
    "may" => 5,
    "june" | "jun" => 6,
    "july" | "jul" => 7,
    "august" | "aug" => 8,
    "september" | "sept" | "sep" => 9,
    "october" | "oct" => 10,
    "november" | "nov" => 11,
    "december" | "dec" => 12,
    _ => return None,
  };
  Some(m)
}

/// `1`–`31`, allowing an ordinal suffix (`3rd`).
fn day(token: &str) -> Option<u32> {
  let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
  if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok()
}

fn year(token: &str) -> Option<i32> {
  if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
    token.parse().ok()
  } else {
    None
  }
}

/// The first calendar date in `text`, trying each shape over the whole text
/// before moving on to the next.
pub fn find_date(text: &str) -> Option<NaiveDate> {
  let toks = tokens(text);

  // 15 July 2025
  let day_month_year = toks.windows(3).find_map(|w| {
    NaiveDate::from_ymd_opt(year(w[2])?, month(w[1])?, day(w[0])?)
  });
  // July 15, 2025 / Monday, July 15, 2025
  let month_day_year = || {
    toks.windows(3).find_map(|w| {
      NaiveDate::from_ymd_opt(year(w[2])?, month(w[0])?, day(w[1])?)
    })
  };
  // 15/07/2025
  let slashed = || {
    toks
      .iter()
      .find_map(|t| NaiveDate::parse_from_str(t, "%d/%m/%Y").ok())
  };
  // 2025-07-15, possibly the head of an ISO timestamp
  let iso = || {
    toks.iter().find_map(|t| {
      let head = t.get(..10)?;
      if !is_iso_date_shaped(head) {
        return None;
      }
      NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    })
  };

  day_month_year
    .or_else(month_day_year)
    .or_else(slashed)
    .or_else(iso)
}

// ─── Times ───────────────────────────────────────────────────────────────────

/// End index of an `H:MM` / `HH:MM` clock starting at byte `i`.
fn clock_at(b: &[u8], i: usize) -> Option<usize> {
  if i > 0 && b[i - 1].is_ascii_digit() {
    return None;
  }
  let mut j = i;
  while j < b.len() && j - i < 2 && b[j].is_ascii_digit() {
    j += 1;
  }
  if j == i || b.get(j) != Some(&b':') {
    return None;
  }
  let minutes = b.get(j + 1..j + 3)?;
  if !minutes.iter().all(u8::is_ascii_digit) {
    return None;
  }
  if b.get(j + 3).is_some_and(u8::is_ascii_digit) {
    return None;
  }
  Some(j + 3)
}

fn skip_spaces(s: &str, i: usize) -> usize {
  i + (s.len() - i - s[i..].trim_start().len())
}

/// ` AM` / ` PM` following a clock, as `(suffix, end)`.
fn meridiem_at(s: &str, i: usize) -> Option<(&'static str, usize)> {
  let k = skip_spaces(s, i);
  let head = s.get(k..k + 2)?.to_ascii_lowercase();
  let suffix = match head.as_str() {
    "am" => "AM",
    "pm" => "PM",
    _ => return None,
  };
  if s[k + 2..].starts_with(|c: char| c.is_ascii_alphabetic()) {
    return None;
  }
  Some((suffix, k + 2))
}

/// One clock with an optional meridiem, as `(text, end)`.
fn time_at(s: &str, i: usize) -> Option<(String, usize)> {
  let end = clock_at(s.as_bytes(), i)?;
  let clock = &s[i..end];
  Some(match meridiem_at(s, end) {
    Some((suffix, end)) => (format!("{clock} {suffix}"), end),
    None => (clock.to_owned(), end),
  })
}

/// The first clock time in `text`, extended to a range when another clock
/// follows after a dash: `"19:00"`, `"7:30 PM"`, `"09:00 - 18:00"`.
pub fn find_time(text: &str) -> Option<String> {
  let bytes = text.as_bytes();
  let (start, end) = (0..bytes.len())
    .filter(|&i| bytes[i].is_ascii_digit())
    .find_map(|i| time_at(text, i))?;

  let k = skip_spaces(text, end);
  let rest = &text[k..];
  let dash = ['-', '–', '—'].into_iter().find(|d| rest.starts_with(*d));
  if let Some(dash) = dash {
    let k = skip_spaces(text, k + dash.len_utf8());
    if let Some((finish, _)) = time_at(text, k) {
      return Some(format!("{start} - {finish}"));
    }
  }
  Some(start)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 7, 2).unwrap() }

  #[test]
  fn recognises_common_date_shapes() {
    let expected = NaiveDate::from_ymd_opt(2025, 7, 15);
    for text in [
      "15 July 2025",
      "July 15, 2025",
      "Monday, July 15, 2025",
      "Tue 15 Jul 2025 · 19:00",
      "15/07/2025",
      "2025-07-15",
      "2025-07-15T19:00:00+02:00",
      "15th July 2025",
    ] {
      assert_eq!(find_date(text), expected, "{text}");
    }
  }

  #[test]
  fn impossible_dates_are_not_dates() {
    assert_eq!(find_date("31 February 2025"), None);
    assert_eq!(find_date("Doors 15 2025"), None);
    assert_eq!(find_date("Every weekend"), None);
  }

  #[test]
  fn unparseable_text_falls_back_to_an_offset_from_today() {
    let when = parse_when("Every weekend", today(), 7);
    assert_eq!(when.date, "2025-07-09");
    assert_eq!(when.time.as_deref(), Some(ALL_DAY));

    assert_eq!(parse_when("Soon", today(), 3).date, "2025-07-05");
  }

  #[test]
  fn times_and_ranges() {
    assert_eq!(find_time("3 July 2025, 09:00 - 18:00").as_deref(), Some("09:00 - 18:00"));
    assert_eq!(find_time("3 July 2025 9:30–12:00").as_deref(), Some("9:30 - 12:00"));
    assert_eq!(find_time("Saturday 19:00").as_deref(), Some("19:00"));
    assert_eq!(find_time("Sat, Jul 12, 7:30 PM").as_deref(), Some("7:30 PM"));
    assert_eq!(find_time("7:30pm - 10:00pm").as_deref(), Some("7:30 PM - 10:00 PM"));
    assert_eq!(find_time("2025-07-15"), None);
    assert_eq!(find_time("Room 123:456"), None);
  }

  #[test]
  fn machine_readable_timestamps() {
    let when = parse_iso("2025-07-11T18:00:00+02:00").unwrap();
    assert_eq!(when.date, "2025-07-11");
    assert_eq!(when.time.as_deref(), Some("18:00"));

    let when = parse_iso("2025-07-11T18:30").unwrap();
    assert_eq!(when.time.as_deref(), Some("18:30"));

    let when = parse_iso("2025-07-11").unwrap();
    assert_eq!(when.time, None);

    assert!(parse_iso("next friday").is_none());
  }
}
