//! Engine and scheduler tests against an in-memory SQLite store.

mod support;
