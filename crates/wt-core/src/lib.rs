//! Core domain logic for the work-time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: the four work state-change signals (START, PAUSE, RESUME, END)
//! - Reconstruction: folding a day's ordered events into worked time + status
//! - Snapshots: the wire-facing status summary for a (user, day) pair

pub mod event;
pub mod reconstruct;
mod snapshot;
pub mod types;

pub use event::{EventKind, UnknownEventKind, WorkEvent};
pub use reconstruct::{DaySummary, WorkStatus, summarize_day};
pub use snapshot::StatusSnapshot;
pub use types::{Username, ValidationError};
