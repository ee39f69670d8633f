//! Append-only event store for the work-time tracker.
//!
//! Provides persistence for work events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared across
//! threads without external synchronization. The server opens one connection per
//! request, so no cross-request state is shared through this crate.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). This ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! ## Day Derivation
//!
//! The `day` column (`YYYY-MM-DD`) is always the UTC calendar date of the
//! timestamp, written by [`Database::append_event`] at insert time. It is never
//! accepted from callers, so it cannot drift from the timestamp.
//!
//! Events are never updated or deleted. Each append runs in its own implicit
//! transaction and is committed before `append_event` returns.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;
use wt_core::{EventKind, Username, WorkEvent};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an event timestamp read back from the database.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row failed domain validation (tampered or corrupt database).
    #[error("invalid row for event {event_id}: {message}")]
    InvalidRow { event_id: i64, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Work events table: append-only log of state changes
            -- timestamp: RFC 3339 UTC (e.g., '2024-01-15T10:30:00.000Z')
            -- day: YYYY-MM-DD, always derived from timestamp
            CREATE TABLE IF NOT EXISTS work_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                event_type TEXT NOT NULL
                    CHECK(event_type IN ('START', 'PAUSE', 'RESUME', 'END')),
                day TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_work_events_user_day
                ON work_events(username, day);
            ",
        )?;
        Ok(())
    }

    /// Appends one event at the current UTC instant.
    ///
    /// The event's day is derived from its timestamp. No validation is
    /// performed against the user's prior event kind: any kind may
    /// follow any kind. The insert is committed before this returns.
    pub fn append_event(
        &mut self,
        username: &Username,
        kind: EventKind,
    ) -> Result<WorkEvent, DbError> {
        self.append_event_at(username, kind, Utc::now())
    }

    fn append_event_at(
        &mut self,
        username: &Username,
        kind: EventKind,
        timestamp: DateTime<Utc>,
    ) -> Result<WorkEvent, DbError> {
        let day = timestamp.date_naive();
        self.conn.execute(
            "INSERT INTO work_events (username, timestamp, event_type, day) VALUES (?, ?, ?, ?)",
            params![
                username.as_str(),
                format_timestamp(timestamp),
                kind.as_str(),
                day.to_string(),
            ],
        )?;
        tracing::info!(user = %username, %kind, %day, "event appended");
        Ok(WorkEvent {
            username: username.clone(),
            timestamp,
            kind,
        })
    }

    /// Lists a user's events for one UTC day, ordered by timestamp.
    ///
    /// Ties on timestamp fall back to insertion order (rowid). Returns
    /// an empty vec when the user has no events that day.
    pub fn events_for_day(
        &self,
        username: &Username,
        day: NaiveDate,
    ) -> Result<Vec<WorkEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, username, timestamp, event_type
            FROM work_events
            WHERE username = ? AND day = ?
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![username.as_str(), day.to_string()], |row| {
            let id: i64 = row.get(0)?;
            let username: String = row.get(1)?;
            let timestamp: String = row.get(2)?;
            let event_type: String = row.get(3)?;
            Ok((id, username, timestamp, event_type))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, username, timestamp, event_type) = row?;
            events.push(parse_row(id, &username, &timestamp, &event_type)?);
        }
        Ok(events)
    }
}

/// Rebuilds a domain event from its stored columns.
///
/// The store only ever writes validated values, so failures here mean
/// the database was modified out of band.
fn parse_row(
    id: i64,
    username: &str,
    timestamp: &str,
    event_type: &str,
) -> Result<WorkEvent, DbError> {
    let username = Username::new(username).map_err(|e| DbError::InvalidRow {
        event_id: id,
        message: e.to_string(),
    })?;
    let kind: EventKind = event_type.parse().map_err(|e: wt_core::UnknownEventKind| {
        DbError::InvalidRow {
            event_id: id,
            message: e.to_string(),
        }
    })?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: id,
            timestamp: timestamp.to_string(),
            source,
        })?;
    Ok(WorkEvent {
        username,
        timestamp,
        kind,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
