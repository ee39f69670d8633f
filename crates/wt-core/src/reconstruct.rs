//! Duration reconstruction over a day's ordered event log.
//!
//! The only real logic in the system lives here: a linear scan that
//! folds START/PAUSE/RESUME/END events into total worked seconds plus
//! a current status.
//!
//! # Algorithm Summary
//!
//! 1. Status comes from the last event alone (START/RESUME ⇒ working,
//!    PAUSE ⇒ paused, END ⇒ ended; no events ⇒ not started).
//! 2. Worked time is the sum of closed segments: each START/RESUME
//!    opens a segment, each PAUSE/END closes it and accumulates its
//!    duration. A START/RESUME while a segment is already open resets
//!    the segment start and the earlier open interval is discarded —
//!    it was never closed, so it never counted.
//! 3. If the final event left a segment open, the segment is extended
//!    to `now` (the "still working" live extension).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventKind, WorkEvent};

/// Current work status for a (user, day) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    /// No events recorded today.
    NotStartedToday,
    /// Last event was START or RESUME.
    Working,
    /// Last event was PAUSE.
    Paused,
    /// Last event was END.
    Ended,
}

impl WorkStatus {
    /// Wire representation, matching the serde rename.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStartedToday => "NOT_STARTED_TODAY",
            Self::Working => "WORKING",
            Self::Paused => "PAUSED",
            Self::Ended => "ENDED",
        }
    }
}

impl From<EventKind> for WorkStatus {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Start | EventKind::Resume => Self::Working,
            EventKind::Pause => Self::Paused,
            EventKind::End => Self::Ended,
        }
    }
}

/// Result of reconstructing one day's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    /// Current status, derived from the last event.
    pub status: WorkStatus,
    /// Total worked time in whole seconds, never negative.
    pub worked_seconds: i64,
    /// Kind of the last recorded event, if any.
    pub last_event: Option<EventKind>,
}

impl DaySummary {
    /// The summary for a day with no events.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            status: WorkStatus::NotStartedToday,
            worked_seconds: 0,
            last_event: None,
        }
    }
}

/// Fractional seconds between two instants.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond counts for a single day fit well within f64 precision"
)]
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

/// Reconstructs worked time and status from one day's events.
///
/// `events` must be ordered by timestamp ascending (ties in insertion
/// order), which is exactly what the store's day query returns. The
/// function is pure: same events and same `now` give the same summary.
///
/// No prior-state validation is applied to the sequence. Any kind may
/// follow any kind; an unclosed segment that gets re-opened by another
/// START/RESUME is silently discarded.
#[must_use]
pub fn summarize_day(events: &[WorkEvent], now: DateTime<Utc>) -> DaySummary {
    let Some(last) = events.last() else {
        return DaySummary::empty();
    };

    let status = WorkStatus::from(last.kind);
    let mut total_seconds = 0.0;
    let mut open_segment_start: Option<DateTime<Utc>> = None;

    for event in events {
        match event.kind {
            EventKind::Start | EventKind::Resume => {
                open_segment_start = Some(event.timestamp);
            }
            EventKind::Pause | EventKind::End => {
                if let Some(start) = open_segment_start.take() {
                    total_seconds += seconds_between(start, event.timestamp);
                }
            }
        }
    }

    // Last event was START/RESUME with no closing PAUSE/END: the user
    // is still working, so count up to `now`.
    if status == WorkStatus::Working {
        if let Some(start) = open_segment_start {
            total_seconds += seconds_between(start, now);
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "rounded worked seconds for one day are far below i64 range"
    )]
    let worked_seconds = (total_seconds.round() as i64).max(0);

    DaySummary {
        status,
        worked_seconds,
        last_event: Some(last.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Username;

    fn at(time: &str) -> DateTime<Utc> {
        format!("2024-01-15T{time}Z").parse().expect("valid timestamp")
    }

    fn ev(kind: EventKind, time: &str) -> WorkEvent {
        WorkEvent {
            username: Username::new("alice").unwrap(),
            timestamp: at(time),
            kind,
        }
    }

    #[test]
    fn empty_day_is_not_started() {
        let summary = summarize_day(&[], at("12:00:00"));
        assert_eq!(summary, DaySummary::empty());
        assert_eq!(summary.status, WorkStatus::NotStartedToday);
        assert_eq!(summary.worked_seconds, 0);
        assert_eq!(summary.last_event, None);
    }

    #[test]
    fn closed_interval_sums() {
        let events = [
            ev(EventKind::Start, "00:00:00"),
            ev(EventKind::Pause, "00:10:00"),
        ];
        let summary = summarize_day(&events, at("12:00:00"));
        assert_eq!(summary.worked_seconds, 600);
        assert_eq!(summary.status, WorkStatus::Paused);
        assert_eq!(summary.last_event, Some(EventKind::Pause));
    }

    #[test]
    fn resume_accumulates_across_segments() {
        let events = [
            ev(EventKind::Start, "00:00:00"),
            ev(EventKind::Pause, "00:05:00"),
            ev(EventKind::Resume, "00:10:00"),
            ev(EventKind::End, "00:15:00"),
        ];
        let summary = summarize_day(&events, at("12:00:00"));
        assert_eq!(summary.worked_seconds, 600);
        assert_eq!(summary.status, WorkStatus::Ended);
        assert_eq!(summary.last_event, Some(EventKind::End));
    }

    #[test]
    fn double_start_discards_open_interval() {
        let events = [
            ev(EventKind::Start, "00:00:00"),
            ev(EventKind::Start, "00:10:00"),
            ev(EventKind::Pause, "00:15:00"),
        ];
        let summary = summarize_day(&events, at("12:00:00"));
        // Only the second START..PAUSE counts; the first segment was
        // never closed before being re-opened.
        assert_eq!(summary.worked_seconds, 300);
        assert_eq!(summary.status, WorkStatus::Paused);
    }

    #[test]
    fn working_extends_to_now() {
        let events = [ev(EventKind::Start, "09:00:00")];
        let summary = summarize_day(&events, at("09:02:00"));
        assert_eq!(summary.status, WorkStatus::Working);
        assert_eq!(summary.worked_seconds, 120);
    }

    #[test]
    fn working_after_resume_extends_to_now() {
        let events = [
            ev(EventKind::Start, "09:00:00"),
            ev(EventKind::Pause, "09:10:00"),
            ev(EventKind::Resume, "09:30:00"),
        ];
        let summary = summarize_day(&events, at("09:40:00"));
        assert_eq!(summary.status, WorkStatus::Working);
        assert_eq!(summary.worked_seconds, 600 + 600);
    }

    #[test]
    fn computation_is_pure() {
        let events = [
            ev(EventKind::Start, "00:00:00"),
            ev(EventKind::Pause, "00:07:30"),
        ];
        let now = at("12:00:00");
        assert_eq!(summarize_day(&events, now), summarize_day(&events, now));
    }

    #[test]
    fn worked_seconds_grows_while_working() {
        let events = [ev(EventKind::Start, "09:00:00")];
        let earlier = summarize_day(&events, at("09:01:00")).worked_seconds;
        let later = summarize_day(&events, at("09:05:00")).worked_seconds;
        assert!(later >= earlier);
    }

    #[test]
    fn pause_without_start_counts_nothing() {
        // Permissive append policy means this sequence can exist.
        let events = [ev(EventKind::Pause, "09:00:00")];
        let summary = summarize_day(&events, at("12:00:00"));
        assert_eq!(summary.status, WorkStatus::Paused);
        assert_eq!(summary.worked_seconds, 0);
        assert_eq!(summary.last_event, Some(EventKind::Pause));
    }

    #[test]
    fn end_freezes_the_total() {
        let events = [
            ev(EventKind::Start, "09:00:00"),
            ev(EventKind::End, "10:00:00"),
        ];
        let at_noon = summarize_day(&events, at("12:00:00"));
        let at_night = summarize_day(&events, at("23:00:00"));
        assert_eq!(at_noon.worked_seconds, 3600);
        assert_eq!(at_noon, at_night);
        assert_eq!(at_noon.status, WorkStatus::Ended);
    }

    #[test]
    fn fractional_seconds_round_half_away_from_zero() {
        let events = [
            WorkEvent {
                username: Username::new("alice").unwrap(),
                timestamp: "2024-01-15T00:00:00.000Z".parse().unwrap(),
                kind: EventKind::Start,
            },
            WorkEvent {
                username: Username::new("alice").unwrap(),
                timestamp: "2024-01-15T00:00:10.500Z".parse().unwrap(),
                kind: EventKind::End,
            },
        ];
        let summary = summarize_day(&events, at("12:00:00"));
        assert_eq!(summary.worked_seconds, 11);
    }

    #[test]
    fn status_strings_match_wire_format() {
        assert_eq!(WorkStatus::NotStartedToday.as_str(), "NOT_STARTED_TODAY");
        assert_eq!(WorkStatus::Working.as_str(), "WORKING");
        assert_eq!(WorkStatus::Paused.as_str(), "PAUSED");
        assert_eq!(WorkStatus::Ended.as_str(), "ENDED");
        let json = serde_json::to_string(&WorkStatus::NotStartedToday).unwrap();
        assert_eq!(json, "\"NOT_STARTED_TODAY\"");
    }
}
