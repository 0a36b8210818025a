//! [`SqliteStore`]: the SQLite implementation of [`EventStore`].

use std::{collections::HashSet, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};

use uitagenda_core::{
  event::{EventRecord, NewEvent},
  query::{ALL_CATEGORIES, EventQuery},
  store::{EventStore, SourceStats, StoreStats},
};

use crate::{
  Error, Result,
  encode::{EVENT_COLUMNS, RawEvent, decode_dt, encode_dt, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, e.g. for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Rewrite an event's creation time. Tests use this to age rows.
  #[cfg(test)]
  pub(crate) async fn set_created_at(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
    let at_str = encode_dt(at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE events SET created_at = ?2, updated_at = MAX(updated_at, ?2) WHERE id = ?1",
          rusqlite::params![id, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Smuggle a decode failure out of a `tokio_rusqlite` closure.
fn call_error(e: Error) -> tokio_rusqlite::Error { tokio_rusqlite::Error::Other(Box::new(e)) }

fn insert_event(
  tx: &rusqlite::Transaction<'_>,
  event: &NewEvent,
  now: &str,
) -> rusqlite::Result<i64> {
  tx.execute(
    "INSERT INTO events (
       title, date, source, description, time, location, address,
       category, cost, organizer, image, source_url,
       created_at, updated_at, is_active
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13, 1)",
    rusqlite::params![
      event.title,
      event.date,
      event.source,
      event.description,
      event.time,
      event.location,
      event.address,
      event.category,
      event.cost,
      event.organizer,
      event.image,
      event.source_url,
      now,
    ],
  )?;
  Ok(tx.last_insert_rowid())
}

fn update_event(tx: &rusqlite::Transaction<'_>, record: &EventRecord) -> rusqlite::Result<()> {
  tx.execute(
    "UPDATE events SET
       description = ?2, time = ?3, location = ?4, address = ?5,
       category = ?6, cost = ?7, organizer = ?8, image = ?9, source_url = ?10,
       updated_at = ?11, is_active = ?12
     WHERE id = ?1",
    rusqlite::params![
      record.id,
      record.description,
      record.time,
      record.location,
      record.address,
      record.category,
      record.cost,
      record.organizer,
      record.image,
      record.source_url,
      encode_dt(record.updated_at),
      record.is_active,
    ],
  )?;
  Ok(())
}

/// Escape `%`, `_` and `\` for use inside a `LIKE ... ESCAPE '\'` pattern.
///
/// Case is left alone: the query lowers the pattern with SQLite's `LOWER`,
/// the same function applied to the columns.
fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert(&self, event: NewEvent) -> Result<(EventRecord, bool)> {
    let now = now();
    let now_str = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing = tx
          .query_row(
            &format!(
              "SELECT {EVENT_COLUMNS} FROM events
               WHERE title = ?1 AND date = ?2 AND source = ?3"
            ),
            rusqlite::params![event.title, event.date, event.source],
            RawEvent::from_row,
          )
          .optional()?;

        let outcome = match existing {
          Some(raw) => {
            let mut record = raw.into_record().map_err(call_error)?;
            record.merge(event, now);
            update_event(&tx, &record)?;
            (record, false)
          }
          None => {
            let id = insert_event(&tx, &event, &now_str)?;
            (EventRecord::from_new(id, event, now), true)
          }
        };

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(outcome)
  }

  async fn deactivate_missing(&self, source: &str, keep_ids: &HashSet<i64>) -> Result<u64> {
    let source = source.to_owned();
    let mut ids: Vec<i64> = keep_ids.iter().copied().collect();
    ids.sort_unstable();
    let ids_json = serde_json::to_string(&ids)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE events SET is_active = 0
           WHERE source = ?1
             AND is_active = 1
             AND id NOT IN (SELECT value FROM json_each(?2))",
          rusqlite::params![source, ids_json],
        )?)
      })
      .await?;

    Ok(changed as u64)
  }

  async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
    let cutoff_str = encode_dt(cutoff);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM events WHERE created_at < ?1",
          rusqlite::params![cutoff_str],
        )?)
      })
      .await?;

    Ok(removed as u64)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: i64) -> Result<Option<EventRecord>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
              rusqlite::params![id],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_record).transpose()
  }

  async fn query(&self, query: &EventQuery) -> Result<Vec<EventRecord>> {
    // Build WHERE clause and positional parameters together.
    let mut conds: Vec<String> = vec!["is_active = 1".to_owned()];
    let mut params: Vec<Value> = vec![];

    if let Some(term) = query.effective_search() {
      params.push(Value::Text(like_pattern(term)));
      let n = params.len();
      conds.push(format!(
        "(LOWER(title) LIKE LOWER(?{n}) ESCAPE '\\'
          OR LOWER(COALESCE(description, '')) LIKE LOWER(?{n}) ESCAPE '\\'
          OR LOWER(COALESCE(location, '')) LIKE LOWER(?{n}) ESCAPE '\\')"
      ));
    }
    if let Some(category) = query.effective_category() {
      params.push(Value::Text(category.to_owned()));
      conds.push(format!("category = ?{}", params.len()));
    }
    if let Some(range) = query.date_range() {
      params.push(Value::Text(range.start));
      params.push(Value::Text(range.end));
      let n = params.len();
      conds.push(format!("date >= ?{} AND date <= ?{n}", n - 1));
    }

    let sql = format!(
      "SELECT {EVENT_COLUMNS} FROM events
       WHERE {}
       ORDER BY date ASC, time ASC, id ASC",
      conds.join(" AND ")
    );

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_record).collect()
  }

  async fn categories(&self) -> Result<Vec<String>> {
    let mut categories: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT category FROM events
           WHERE is_active = 1
             AND category IS NOT NULL
             AND category != ''
             AND category != ?1
           ORDER BY category ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![ALL_CATEGORIES], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    categories.insert(0, ALL_CATEGORIES.to_owned());
    Ok(categories)
  }

  async fn count_inactive(&self, source: &str) -> Result<u64> {
    let source = source.to_owned();
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM events WHERE source = ?1 AND is_active = 0",
          rusqlite::params![source],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn stats(&self) -> Result<StoreStats> {
    let rows: Vec<(String, i64, Option<String>)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT source, COUNT(*), MAX(updated_at) FROM events
           WHERE is_active = 1
           GROUP BY source
           ORDER BY source ASC",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let sources = rows
      .into_iter()
      .map(|(source, active, last)| {
        Ok(SourceStats {
          source,
          active: active as u64,
          last_updated: last.as_deref().map(decode_dt).transpose()?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(StoreStats {
      total_active: sources.iter().map(|s| s.active).sum(),
      sources,
    })
  }
}
