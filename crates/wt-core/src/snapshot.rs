//! The wire-facing status snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::EventKind;
use crate::reconstruct::{DaySummary, WorkStatus};
use crate::types::Username;

/// Derived status summary for one (user, day) pair.
///
/// This is the JSON body returned by every API endpoint. It is
/// recomputed from the event log per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Current work status.
    pub status: WorkStatus,
    /// Total worked time today in whole seconds.
    pub worked_today_seconds: i64,
    /// Kind of the last recorded event, or null if none.
    pub last_event_type: Option<EventKind>,
    /// The user this snapshot describes.
    pub username: Username,
    /// The UTC day this snapshot covers (`YYYY-MM-DD`).
    pub day: NaiveDate,
}

impl StatusSnapshot {
    /// Combines a day summary with its (user, day) key.
    #[must_use]
    pub fn new(username: Username, day: NaiveDate, summary: DaySummary) -> Self {
        Self {
            status: summary.status,
            worked_today_seconds: summary.worked_seconds,
            last_event_type: summary.last_event,
            username,
            day,
        }
    }
}
