//! Adapter for Eventbrite's free events in Amsterdam.
//!
//! Cards are read from the search results markup. Events published as
//! schema.org `Event` objects in `application/ld+json` scripts fill the
//! remaining slots up to `max_count`.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use uitagenda_core::{
  raw::RawRecord,
  source::{BoxFuture, SourceAdapter, SourceError},
};

use crate::{
  PLACEHOLDER_IMAGE,
  categorize::EVENTBRITE as CATEGORIES,
  dates, extract,
  extract::{HEADINGS, descendants, find, non_empty_text},
  http,
};

pub const NAME: &str = "Eventbrite";
pub const BASE_URL: &str = "https://www.eventbrite.com";
pub const LISTING_URL: &str = "https://www.eventbrite.com/d/netherlands--amsterdam/free--events/";

const FALLBACK_DAYS: u64 = 3;
const DEFAULT_ORGANIZER: &str = "Eventbrite Organizer";
const EVENT_LINKS: &[&str] = &["/e/"];

pub struct Eventbrite {
  client: Client,
  url:    String,
}

impl Eventbrite {
  pub fn new(client: Client) -> Self {
    Self {
      client,
      url: LISTING_URL.to_owned(),
    }
  }

  pub fn with_url(mut self, url: impl Into<String>) -> Self {
    self.url = url.into();
    self
  }
}

impl SourceAdapter for Eventbrite {
  fn name(&self) -> &str { NAME }

  fn fetch(&self, max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    Box::pin(async move {
      let html = http::fetch_page(&self.client, &self.url).await?;
      parse_listing(&html, max_count, Local::now().date_naive())
    })
  }
}

// ─── Cards ───────────────────────────────────────────────────────────────────

/// Extract up to `max_count` candidates from a search results page.
pub fn parse_listing(
  html: &str,
  max_count: usize,
  today: NaiveDate,
) -> Result<Vec<RawRecord>, SourceError> {
  let document = Html::parse_document(html);
  let root = document.root_element();
  let img = extract::selector("img")?;

  let mut containers = extract::containers(root, &["div", "article"], "class", &[
    "event-card",
    "search-event-card",
    "event-item",
  ]);
  if containers.is_empty() {
    containers = extract::containers(root, &["div"], "data-testid", &["event"]);
  }
  if containers.is_empty() {
    containers = extract::containers(root, &["div", "article"], "href", EVENT_LINKS);
  }
  tracing::info!(source = NAME, containers = containers.len(), "found candidate containers");

  let mut records: Vec<RawRecord> = containers
    .into_iter()
    .take(max_count)
    .filter_map(|card| extract_card(card, &img, today))
    .collect();

  let remaining = max_count.saturating_sub(records.len());
  records.extend(json_ld_events(&document)?.into_iter().take(remaining));
  Ok(records)
}

fn with_amsterdam(location: &str) -> String {
  if location.to_lowercase().contains("amsterdam") {
    location.to_owned()
  } else {
    format!("{location}, Amsterdam")
  }
}

fn extract_card(card: ElementRef<'_>, img: &Selector, today: NaiveDate) -> Option<RawRecord> {
  let title = find(card, HEADINGS, "class", &["title", "name", "heading"])
    .or_else(|| find(card, &["a"], "class", &["event-title", "title"]))
    .or_else(|| find(card, &["a"], "href", EVENT_LINKS))
    .and_then(non_empty_text)?;

  let mut raw = RawRecord::new().with("title", title.as_str()).with("cost", "Free");

  if let Some(url) = extract::link(card, EVENT_LINKS, BASE_URL) {
    raw.set("source_url", url);
  }

  let date_el = descendants(card)
    .find(|el| el.value().name() == "time")
    .or_else(|| find(card, &["div", "span"], "class", &["date", "time"]));
  if let Some(el) = date_el {
    // A machine-readable attribute is authoritative; if it cannot be read
    // the card keeps no date rather than guessing.
    let when = match el.value().attr("datetime") {
      Some(attr) => dates::parse_iso(attr),
      None => Some(dates::parse_when(&extract::text(el), today, FALLBACK_DAYS)),
    };
    if let Some(when) = when {
      raw.set("date", when.date);
      if let Some(time) = when.time {
        raw.set("time", time);
      }
    }
  }

  match find(card, &["div", "span"], "class", &["location", "venue", "address"])
    .and_then(non_empty_text)
  {
    Some(location) => {
      raw.set("address", with_amsterdam(&location));
      raw.set("location", location);
    }
    None => {
      raw.set("location", "Amsterdam");
      raw.set("address", "Amsterdam, Netherlands");
    }
  }

  let description = find(card, &["p", "div"], "class", &["description", "summary", "excerpt"])
    .and_then(non_empty_text)
    .map(|d| extract::truncate(&d))
    .unwrap_or_else(|| format!("Join this free event in Amsterdam. Check {title} for more details."));
  raw.set("category", CATEGORIES.categorize(&title, &description));
  raw.set("description", description);

  raw.set(
    "image",
    extract::image(card, img, BASE_URL).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
  );

  let organizer = find(card, &["div", "span"], "class", &["organizer", "host", "by"])
    .and_then(non_empty_text)
    .unwrap_or_else(|| DEFAULT_ORGANIZER.to_owned());
  raw.set("organizer", organizer);

  Some(raw)
}

// ─── JSON-LD ─────────────────────────────────────────────────────────────────

fn json_ld_events(document: &Html) -> Result<Vec<RawRecord>, SourceError> {
  let scripts = extract::selector(r#"script[type="application/ld+json"]"#)?;
  let mut events = Vec::new();

  for script in document.select(&scripts) {
    let body: String = script.text().collect();
    let value: Value = match serde_json::from_str(&body) {
      Ok(value) => value,
      Err(e) => {
        tracing::debug!(error = %e, "skipping unreadable JSON-LD block");
        continue;
      }
    };
    let items = match value {
      Value::Array(items) => items,
      other => vec![other],
    };
    events.extend(
      items
        .iter()
        .filter(|item| item["@type"] == "Event")
        .filter_map(event_from_json_ld),
    );
  }

  Ok(events)
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
  value.get(key)?.as_str().map(str::trim).filter(|s| !s.is_empty())
}

fn event_from_json_ld(item: &Value) -> Option<RawRecord> {
  let title = str_field(item, "name")?;
  let mut raw = RawRecord::new().with("title", title).with("cost", "Free");

  let description = str_field(item, "description").map(extract::truncate);
  raw.set("category", CATEGORIES.categorize(title, description.as_deref().unwrap_or("")));
  if let Some(description) = description {
    raw.set("description", description);
  }

  if let Some(when) = str_field(item, "startDate").and_then(dates::parse_iso) {
    raw.set("date", when.date);
    if let Some(time) = when.time {
      raw.set("time", time);
    }
  }

  if let Some(location) = item.get("location").filter(|l| l.is_object()) {
    let name = str_field(location, "name");
    match location.get("address").filter(|a| a.is_object()) {
      Some(address) => {
        let street = str_field(address, "streetAddress");
        let city = str_field(address, "addressLocality").unwrap_or("Amsterdam");
        raw.set("location", name.or(street).unwrap_or("Amsterdam"));
        raw.set("address", match street {
          Some(street) => format!("{street}, {city}"),
          None => city.to_owned(),
        });
      }
      None => {
        raw.set("location", name.unwrap_or("Amsterdam"));
        raw.set("address", "Amsterdam, Netherlands");
      }
    }
  }

  if let Some(organizer) = item.get("organizer").filter(|o| o.is_object()) {
    raw.set("organizer", str_field(organizer, "name").unwrap_or(DEFAULT_ORGANIZER));
  }

  let image = match item.get("image") {
    Some(Value::Array(images)) => images.first(),
    other => other,
  };
  let image = match image {
    Some(Value::String(url)) => Some(url.as_str()),
    Some(obj @ Value::Object(_)) => Some(str_field(obj, "url").unwrap_or(PLACEHOLDER_IMAGE)),
    _ => None,
  };
  if let Some(image) = image {
    raw.set("image", image);
  }

  if let Some(url) = str_field(item, "url") {
    raw.set("source_url", url);
  }

  Some(raw)
}
