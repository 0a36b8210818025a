//! Fixed sample events for demos and local development.

use uitagenda_core::{event::NewEvent, store::EventStore};

use crate::{Error, Result};

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x250";

struct Sample {
  title:       &'static str,
  description: &'static str,
  date:        &'static str,
  time:        &'static str,
  location:    &'static str,
  address:     &'static str,
  category:    &'static str,
  organizer:   &'static str,
  source:      &'static str,
}

const SAMPLES: [Sample; 3] = [
  Sample {
    title:       "Free Exhibition: We are here - A shared past, Muslims tell",
    description: "An exhibition exploring the shared history and stories of Muslims in \
                  Amsterdam and the Netherlands.",
    date:        "2025-07-03",
    time:        "09:00 - 18:00",
    location:    "Amsterdam Public Library (OBA)",
    address:     "Oosterdok 143, Amsterdam",
    category:    "Art & Culture",
    organizer:   "Amsterdam Public Library",
    source:      "I amsterdam",
  },
  Sample {
    title:       "Rooftop Open Mic Night",
    description: "Join us for an evening of music, poetry, and creative expression on our \
                  beautiful rooftop terrace.",
    date:        "2025-07-11",
    time:        "18:00 - 22:00",
    location:    "Zoku Amsterdam",
    address:     "Weesperstraat 105, Amsterdam",
    category:    "Music",
    organizer:   "Zoku Amsterdam",
    source:      "Eventbrite",
  },
  Sample {
    title:       "Community Lunch",
    description: "A weekly community lunch where neighbors can meet, share a meal, and \
                  connect with each other.",
    date:        "2025-07-09",
    time:        "12:00 - 14:00",
    location:    "Equals Clubhouse",
    address:     "Nieuwezijds Voorburgwal 32, Amsterdam",
    category:    "Community",
    organizer:   "Equals Clubhouse",
    source:      "Eventbrite",
  },
];

/// The sample events, all free.
pub fn sample_events() -> Vec<NewEvent> {
  SAMPLES
    .iter()
    .map(|s| NewEvent {
      description: Some(s.description.to_owned()),
      time: Some(s.time.to_owned()),
      location: Some(s.location.to_owned()),
      address: Some(s.address.to_owned()),
      category: Some(s.category.to_owned()),
      cost: Some("Free".to_owned()),
      organizer: Some(s.organizer.to_owned()),
      image: Some(PLACEHOLDER_IMAGE.to_owned()),
      ..NewEvent::new(s.title, s.date, s.source)
    })
    .collect()
}

/// Upsert the sample events. Seeding twice leaves a single copy of each.
///
/// Returns the number of events written.
pub async fn seed_sample_data<S: EventStore>(store: &S) -> Result<usize> {
  let events = sample_events();
  let count = events.len();
  for event in events {
    store.upsert(event).await.map_err(Error::store)?;
  }
  tracing::info!(count, "seeded sample events");
  Ok(count)
}
