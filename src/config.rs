//! Configuration and CLI argument handling

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::state::SessionPhase;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "pomodorify")]
#[command(about = "A state-managed HTTP server for Pomodoro sessions with Spotify playback control")]
#[command(version = "2.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "8888")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory for persisted settings and the Spotify token
    #[arg(long, default_value = ".pomodorify")]
    pub data_dir: String,

    /// Work session duration in minutes
    #[arg(long, default_value = "25")]
    pub work: u64,

    /// Short break duration in minutes
    #[arg(long = "break", default_value = "5")]
    pub break_minutes: u64,

    /// Long break duration in minutes
    #[arg(long, default_value = "15")]
    pub long_break: u64,

    /// Completed work sessions before a long break is inserted
    #[arg(long, default_value = "4")]
    pub intervals: u64,

    /// Spotify application client id
    #[arg(long, env = "SPOTIFY_CLIENT_ID", default_value = "")]
    pub client_id: String,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", default_value = "")]
    pub client_secret: String,

    /// OAuth redirect URI registered with the Spotify application
    #[arg(long, env = "REDIRECT_URI", default_value = "http://localhost:8888/callback")]
    pub redirect_uri: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Timer settings from the CLI flags, used when no persisted settings exist
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            work_minutes: self.work,
            break_minutes: self.break_minutes,
            long_break_minutes: self.long_break,
            intervals_before_long_break: self.intervals,
            ..TimerSettings::default()
        }
    }
}

/// User-adjustable timer settings, persisted as JSON and restorable verbatim.
///
/// Changes are validated at this boundary; the sequencer itself never sees
/// invalid values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub work_minutes: u64,
    pub break_minutes: u64,
    pub long_break_minutes: u64,
    pub intervals_before_long_break: u64,
    pub auto_resume_playback: bool,
    pub chime_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            long_break_minutes: 15,
            intervals_before_long_break: 4,
            auto_resume_playback: true,
            chime_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Check that every duration is positive and the long-break interval is at least 1
    pub fn validate(&self) -> Result<(), String> {
        if self.work_minutes == 0 {
            return Err("work duration must be at least 1 minute".to_string());
        }
        if self.break_minutes == 0 {
            return Err("break duration must be at least 1 minute".to_string());
        }
        if self.long_break_minutes == 0 {
            return Err("long break duration must be at least 1 minute".to_string());
        }
        if self.intervals_before_long_break < 1 {
            return Err("intervals before long break must be at least 1".to_string());
        }
        Ok(())
    }

    /// Configured duration of a phase in seconds
    pub fn duration_seconds(&self, phase: SessionPhase) -> u64 {
        let minutes = match phase {
            SessionPhase::Work => self.work_minutes,
            SessionPhase::ShortBreak => self.break_minutes,
            SessionPhase::LongBreak => self.long_break_minutes,
        };
        minutes * 60
    }
}
