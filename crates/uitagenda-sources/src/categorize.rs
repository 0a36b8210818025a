//! Keyword categorization, one strategy per source.

/// Ordered `(category, keywords)` rules. The first rule with a keyword
/// contained in the lowercased text wins.
pub type Rules = &'static [(&'static str, &'static [&'static str])];

#[derive(Debug, Clone, Copy)]
pub struct Categorizer {
  rules:    Rules,
  fallback: &'static str,
}

impl Categorizer {
  pub const fn new(rules: Rules, fallback: &'static str) -> Self { Self { rules, fallback } }

  pub fn categorize(&self, title: &str, description: &str) -> &'static str {
    let text = format!("{title} {description}").to_lowercase();
    self
      .rules
      .iter()
      .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
      .map_or(self.fallback, |(category, _)| *category)
  }

  pub fn fallback(&self) -> &'static str { self.fallback }
}

pub const IAMSTERDAM: Categorizer = Categorizer::new(
  &[
    ("Music", &[
      "music", "concert", "band", "singer", "dj", "festival", "jazz", "classical", "rock", "pop",
    ]),
    ("Art & Culture", &[
      "art",
      "exhibition",
      "museum",
      "gallery",
      "culture",
      "painting",
      "sculpture",
      "theater",
      "theatre",
    ]),
    ("Sports & Fitness", &[
      "sport", "fitness", "yoga", "running", "cycling", "football", "basketball", "workout",
    ]),
    ("Community", &[
      "community",
      "meetup",
      "networking",
      "social",
      "volunteer",
      "charity",
      "local",
    ]),
    ("Entertainment", &[
      "comedy",
      "show",
      "performance",
      "entertainment",
      "fun",
      "party",
      "celebration",
    ]),
    ("Wellness", &[
      "wellness",
      "meditation",
      "mindfulness",
      "health",
      "therapy",
      "healing",
      "spiritual",
    ]),
  ],
  "Art & Culture",
);

pub const EVENTBRITE: Categorizer = Categorizer::new(
  &[
    ("Music", &[
      "music",
      "concert",
      "band",
      "singer",
      "dj",
      "festival",
      "jazz",
      "classical",
      "rock",
      "pop",
      "acoustic",
      "live music",
    ]),
    ("Art & Culture", &[
      "art",
      "exhibition",
      "museum",
      "gallery",
      "culture",
      "painting",
      "sculpture",
      "theater",
      "theatre",
      "cultural",
    ]),
    ("Sports & Fitness", &[
      "sport", "fitness", "yoga", "running", "cycling", "football", "basketball", "workout",
      "exercise", "training",
    ]),
    ("Community", &[
      "community",
      "meetup",
      "networking",
      "social",
      "volunteer",
      "charity",
      "local",
      "neighborhood",
    ]),
    ("Entertainment", &[
      "comedy",
      "show",
      "performance",
      "entertainment",
      "fun",
      "party",
      "celebration",
      "karaoke",
      "game",
    ]),
    ("Wellness", &[
      "wellness",
      "meditation",
      "mindfulness",
      "health",
      "therapy",
      "healing",
      "spiritual",
      "mental health",
    ]),
  ],
  "Community",
);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_matching_rule_wins() {
    assert_eq!(IAMSTERDAM.categorize("Jazz in the park", ""), "Music");
    assert_eq!(IAMSTERDAM.categorize("Yoga morning", ""), "Sports & Fitness");
    assert_eq!(EVENTBRITE.categorize("Neighbourhood meetup", ""), "Community");
    assert_eq!(EVENTBRITE.categorize("Karaoke night", ""), "Entertainment");
  }

  #[test]
  fn description_is_considered() {
    assert_eq!(
      IAMSTERDAM.categorize("Sunday at the OBA", "A guided MEDITATION session"),
      "Wellness"
    );
  }

  #[test]
  fn unmatched_text_uses_the_source_fallback() {
    assert_eq!(IAMSTERDAM.categorize("Quiet evening", ""), "Art & Culture");
    assert_eq!(EVENTBRITE.categorize("Quiet evening", ""), "Community");
  }
}
