//! SQL schema for the uitagenda SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT keeps ids of purged rows from ever being handed out again.
CREATE TABLE IF NOT EXISTS events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    date        TEXT    NOT NULL,   -- YYYY-MM-DD, compared as text
    source      TEXT    NOT NULL,
    description TEXT,
    time        TEXT,               -- free text, e.g. '19:00 - 21:00' or 'All day'
    location    TEXT,
    address     TEXT,
    category    TEXT,
    cost        TEXT,
    organizer   TEXT,
    image       TEXT,
    source_url  TEXT,
    created_at  TEXT    NOT NULL,   -- fixed-width RFC 3339 UTC
    updated_at  TEXT    NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    UNIQUE (title, date, source),
    CHECK  (title != ''),
    CHECK  (updated_at >= created_at)
);

CREATE INDEX IF NOT EXISTS events_source_active_idx ON events(source, is_active);
CREATE INDEX IF NOT EXISTS events_date_idx          ON events(date, time);
CREATE INDEX IF NOT EXISTS events_created_idx       ON events(created_at);

PRAGMA user_version = 1;
";
