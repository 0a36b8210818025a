//! Adapter for the I amsterdam "what's on" calendar.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use uitagenda_core::{
  raw::RawRecord,
  source::{BoxFuture, SourceAdapter, SourceError},
};

use crate::{
  PLACEHOLDER_IMAGE,
  categorize::IAMSTERDAM as CATEGORIES,
  dates, extract,
  extract::{HEADINGS, find, non_empty_text},
  http,
};

pub const NAME: &str = "I amsterdam";
pub const BASE_URL: &str = "https://www.iamsterdam.com";
pub const LISTING_URL: &str = "https://www.iamsterdam.com/en/whats-on/calendar";

/// Days after today assumed for listings whose date cannot be read.
const FALLBACK_DAYS: u64 = 7;

const EVENT_LINKS: &[&str] = &["/event", "/whats-on"];

/// Every listing is kept. The site has no reliable price markup, and a
/// keyword filter that defaults to "include" would accept everything anyway.
pub struct IAmsterdam {
  client: Client,
  url:    String,
}

impl IAmsterdam {
  pub fn new(client: Client) -> Self {
    Self {
      client,
      url: LISTING_URL.to_owned(),
    }
  }

  /// Fetch from another listing page, e.g. a mirror.
  pub fn with_url(mut self, url: impl Into<String>) -> Self {
    self.url = url.into();
    self
  }
}

impl SourceAdapter for IAmsterdam {
  fn name(&self) -> &str { NAME }

  fn fetch(&self, max_count: usize) -> BoxFuture<'_, Result<Vec<RawRecord>, SourceError>> {
    Box::pin(async move {
      let html = http::fetch_page(&self.client, &self.url).await?;
      parse_listing(&html, max_count, Local::now().date_naive())
    })
  }
}

/// Extract up to `max_count` candidates from a listing page.
pub fn parse_listing(
  html: &str,
  max_count: usize,
  today: NaiveDate,
) -> Result<Vec<RawRecord>, SourceError> {
  let document = Html::parse_document(html);
  let img = extract::selector("img")?;

  let containers = extract::containers(
    document.root_element(),
    &["div", "article"],
    "class",
    &["event", "card", "item"],
  );
  tracing::info!(source = NAME, containers = containers.len(), "found candidate containers");

  Ok(
    containers
      .into_iter()
      .take(max_count)
      .filter_map(|container| extract_listing(container, &img, today))
      .collect(),
  )
}

fn extract_listing(container: ElementRef<'_>, img: &Selector, today: NaiveDate) -> Option<RawRecord> {
  let title = find(container, HEADINGS, "class", &["title", "heading", "name"])
    .or_else(|| find(container, &["a"], "href", EVENT_LINKS))
    .and_then(non_empty_text)?;

  let mut raw = RawRecord::new().with("title", title.as_str()).with("cost", "Free");

  if let Some(el) = find(container, &["time", "div", "span"], "class", &["date", "time"]) {
    let when = dates::parse_when(&extract::text(el), today, FALLBACK_DAYS);
    raw.set("date", when.date);
    if let Some(time) = when.time {
      raw.set("time", time);
    }
  }

  if let Some(location) = find(container, &["div", "span", "p"], "class", &[
    "location", "venue", "address",
  ])
  .and_then(non_empty_text)
  {
    raw.set("address", format!("{location}, Amsterdam"));
    raw.set("location", location);
  }

  let description = find(container, &["p", "div"], "class", &[
    "description",
    "summary",
    "excerpt",
  ])
  .and_then(non_empty_text)
  .map(|d| extract::truncate(&d));

  raw.set("category", CATEGORIES.categorize(&title, description.as_deref().unwrap_or("")));
  if let Some(description) = description {
    raw.set("description", description);
  }

  raw.set(
    "image",
    extract::image(container, img, BASE_URL).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
  );

  let organizer = find(container, &["div", "span"], "class", &["organizer", "venue", "host"])
    .and_then(non_empty_text)
    .unwrap_or_else(|| NAME.to_owned());
  raw.set("organizer", organizer);

  if let Some(url) = extract::link(container, EVENT_LINKS, BASE_URL) {
    raw.set("source_url", url);
  }

  Some(raw)
}
