//! Element lookup helpers shared by the adapters.
//!
//! Listing markup changes often and class names are generated, so lookups
//! match case-insensitive substrings of an attribute rather than exact
//! selectors.

use scraper::{ElementRef, Selector};
use uitagenda_core::source::SourceError;

pub const DESCRIPTION_LIMIT: usize = 300;

pub const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4"];

pub fn selector(css: &str) -> Result<Selector, SourceError> {
  Selector::parse(css).map_err(|e| SourceError::Body(format!("invalid selector {css:?}: {e}")))
}

/// Every element below `scope`, in document order, excluding `scope`.
pub fn descendants<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
  scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

pub fn is_tag(el: &ElementRef<'_>, tags: &[&str]) -> bool { tags.contains(&el.value().name()) }

/// `true` if `attr` contains any of `needles` (which must be lowercase).
pub fn attr_contains(el: &ElementRef<'_>, attr: &str, needles: &[&str]) -> bool {
  el.value().attr(attr).is_some_and(|value| {
    let value = value.to_lowercase();
    needles.iter().any(|n| value.contains(n))
  })
}

/// First element below `scope` with one of `tags` whose `attr` contains one
/// of `needles`.
pub fn find<'a>(
  scope: ElementRef<'a>,
  tags: &[&str],
  attr: &str,
  needles: &[&str],
) -> Option<ElementRef<'a>> {
  descendants(scope).find(|el| is_tag(el, tags) && attr_contains(el, attr, needles))
}

/// Candidate listing containers anywhere in the document.
pub fn containers<'a>(
  root: ElementRef<'a>,
  tags: &[&str],
  attr: &str,
  needles: &[&str],
) -> Vec<ElementRef<'a>> {
  descendants(root)
    .filter(|el| is_tag(el, tags) && attr_contains(el, attr, needles))
    .collect()
}

/// Visible text with whitespace runs collapsed.
pub fn text(el: ElementRef<'_>) -> String {
  el.text()
    .flat_map(str::split_whitespace)
    .collect::<Vec<_>>()
    .join(" ")
}

/// Non-empty text of the element, if any.
pub fn non_empty_text(el: ElementRef<'_>) -> Option<String> {
  Some(text(el)).filter(|t| !t.is_empty())
}

/// Cut `text` to [`DESCRIPTION_LIMIT`] characters, marking the cut.
pub fn truncate(text: &str) -> String {
  if text.chars().count() <= DESCRIPTION_LIMIT {
    return text.to_owned();
  }
  let mut cut: String = text.chars().take(DESCRIPTION_LIMIT).collect();
  cut.push_str("...");
  cut
}

/// Resolve protocol- and root-relative URLs against `base`.
pub fn absolutize(base: &str, url: &str) -> String {
  if url.starts_with("//") {
    format!("https:{url}")
  } else if url.starts_with('/') {
    format!("{}{url}", base.trim_end_matches('/'))
  } else {
    url.to_owned()
  }
}

/// `src` (or lazy-loaded `data-src`) of the first image in `scope`.
pub fn image(scope: ElementRef<'_>, img: &Selector, base: &str) -> Option<String> {
  let el = scope.select(img).next()?;
  let src = el
    .value()
    .attr("src")
    .filter(|s| !s.trim().is_empty())
    .or_else(|| el.value().attr("data-src"))?;
  Some(absolutize(base, src.trim()))
}

/// Absolute `href` of the first link below `scope` whose target contains
/// one of `needles`.
pub fn link(scope: ElementRef<'_>, needles: &[&str], base: &str) -> Option<String> {
  find(scope, &["a"], "href", needles)
    .and_then(|a| a.value().attr("href"))
    .map(|href| absolutize(base, href.trim()))
}
