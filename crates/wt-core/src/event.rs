//! Work events and the event kind enum as the single source of truth
//! for event type strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::Username;

/// Canonical work state-change kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Pause,
    Resume,
    End,
}

impl EventKind {
    /// All valid kinds, in wire order.
    pub const ALL: [Self; 4] = [Self::Start, Self::Pause, Self::Resume, Self::End];

    /// Wire/storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
            Self::End => "END",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START" => Ok(Self::Start),
            "PAUSE" => Ok(Self::Pause),
            "RESUME" => Ok(Self::Resume),
            "END" => Ok(Self::End),
            _ => Err(UnknownEventKind(s.to_string())),
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown event kind strings.
///
/// The message enumerates the valid values so it can be surfaced
/// directly to API clients.
#[derive(Debug, Clone)]
pub struct UnknownEventKind(String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid event_type '{}': must be one of START, PAUSE, RESUME, END",
            self.0
        )
    }
}

impl std::error::Error for UnknownEventKind {}

/// A single work state-change event.
///
/// Events are append-only: once recorded they are never mutated or
/// deleted. The day is always derived from the timestamp, never set
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEvent {
    /// Who emitted the event.
    pub username: Username,
    /// When the event occurred (UTC).
    pub timestamp: DateTime<Utc>,
    /// The state change this event signals.
    pub kind: EventKind,
}

impl WorkEvent {
    /// The UTC calendar date this event belongs to.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
