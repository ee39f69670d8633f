//! HTTP boundary for the work-time tracker.
//!
//! This crate wires the event store and the duration reconstructor
//! behind a small JSON API.

pub mod api;
mod cli;
mod config;

pub use api::{AppState, router};
pub use cli::Cli;
pub use config::Config;
