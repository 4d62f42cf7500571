//! Pomodorify - A state-managed HTTP server for Pomodoro sessions
//!
//! This library provides a Pomodoro session clock and work/break sequencer,
//! an OAuth proxy for Spotify login, and an advisory playback contract that
//! mirrors and controls the user's active Spotify device across phase
//! transitions.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::{Config, TimerSettings};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
