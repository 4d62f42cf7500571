//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::{config::TimerSettings, services::SpotifyCredentials, storage::Storage};

use super::{
    PhaseTransition, PlaybackIntent, PlayerState, SessionClock, SessionPhase, Sequencer,
};

/// Command sent to the playback dispatch task.
///
/// The core never calls the Spotify API itself; it emits these and the
/// dispatch task forwards them to the playback controller fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Intent(PlaybackIntent),
    SkipNext,
    SkipPrevious,
}

/// Serializable combined view of the clock and sequencer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: SessionPhase,
    pub phase_label: String,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub completed_work_sessions: u64,
    pub work_session_count: u64,
    pub break_session_count: u64,
}

/// Clock and sequencer, always mutated together under one lock so a tick can
/// never observe a stale phase
#[derive(Debug)]
struct Session {
    clock: SessionClock,
    sequencer: Sequencer,
}

impl Session {
    fn new(settings: &TimerSettings) -> Self {
        let sequencer = Sequencer::new();
        let clock = SessionClock::new(settings.duration_seconds(sequencer.current_phase));
        Self { clock, sequencer }
    }

    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.sequencer.current_phase,
            phase_label: self.sequencer.current_phase.label().to_string(),
            remaining_seconds: self.clock.remaining_seconds,
            is_running: self.clock.is_running,
            completed_work_sessions: self.sequencer.completed_work_sessions,
            work_session_count: self.sequencer.work_session_count,
            break_session_count: self.sequencer.break_session_count,
        }
    }
}

/// Main application state that manages the session, settings and playback mirror
#[derive(Debug)]
pub struct AppState {
    /// Session clock and sequencer
    session: Arc<Mutex<Session>>,
    /// Timer settings (validated at the update boundary)
    settings: Arc<Mutex<TimerSettings>>,
    /// Mirror of the external playback device plus surfaced errors
    pub player: Arc<Mutex<PlayerState>>,
    /// Spotify access token, if logged in
    token: Arc<Mutex<Option<String>>>,
    /// Persisted settings/token storage (absent in unit tests)
    storage: Option<Storage>,
    /// Spotify application credentials for the OAuth endpoints
    pub credentials: SpotifyCredentials,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel carrying playback commands to the dispatch task
    pub playback_tx: broadcast::Sender<PlaybackCommand>,
    /// Channel for timer snapshot updates
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState with the given settings.
    ///
    /// When storage is provided, a previously persisted token is restored.
    pub fn new(
        port: u16,
        host: String,
        settings: TimerSettings,
        credentials: SpotifyCredentials,
        storage: Option<Storage>,
    ) -> Self {
        let session = Session::new(&settings);
        let (playback_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let token = storage.as_ref().and_then(|s| s.load_token());
        let mut player = PlayerState::new();
        player.authenticated = token.is_some();
        if token.is_some() {
            info!("Restored persisted Spotify token");
        }

        Self {
            session: Arc::new(Mutex::new(session)),
            settings: Arc::new(Mutex::new(settings)),
            player: Arc::new(Mutex::new(player)),
            token: Arc::new(Mutex::new(token)),
            storage,
            credentials,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            playback_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a mutation to the session and publish the resulting snapshot
    fn update_session<F, T>(&self, action: &str, updater: F) -> Result<T, String>
    where
        F: FnOnce(&mut Session) -> T,
    {
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Failed to lock session state: {}", e))?;

        let result = updater(&mut session);
        let snapshot = session.snapshot();
        drop(session);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send timer snapshot update: {}", e);
        }

        Ok(result)
    }

    /// Start the session clock. No-op if already running.
    pub fn start_timer(&self) -> Result<TimerSnapshot, String> {
        self.update_session("start", |session| {
            session.clock.start();
            session.snapshot()
        })
    }

    /// Pause the session clock, preserving the remaining time
    pub fn pause_timer(&self) -> Result<TimerSnapshot, String> {
        self.update_session("pause", |session| {
            session.clock.pause();
            session.snapshot()
        })
    }

    /// Reset the current phase to its configured duration.
    ///
    /// Never touches `completed_work_sessions` or the display counters.
    pub fn reset_timer(&self) -> Result<TimerSnapshot, String> {
        let settings = self.get_settings()?;
        self.update_session("reset", |session| {
            let duration = settings.duration_seconds(session.sequencer.current_phase);
            session.clock.reset(duration as i64);
            session.snapshot()
        })
    }

    /// Skip to the next phase, with the exact transition a natural expiry
    /// would have produced
    pub fn skip_phase(&self) -> Result<TimerSnapshot, String> {
        let settings = self.get_settings()?;
        let (snapshot, transition) = self.update_session("skip", |session| {
            let transition = apply_transition(session, &settings);
            (session.snapshot(), transition)
        })?;

        info!(
            "Skipped into {} ({}s)",
            snapshot.phase_label, transition.next_duration_seconds
        );
        self.send_playback_command(PlaybackCommand::Intent(transition.intent));
        Ok(snapshot)
    }

    /// Advance the clock by one second. Called once per second by the tick task.
    ///
    /// A tick that expires the phase performs the sequencer transition and the
    /// clock reset inside the same critical section, so the transition is
    /// atomic with respect to further ticks.
    pub fn advance_tick(&self) -> Result<Option<PhaseTransition>, String> {
        let settings = self.get_settings()?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Failed to lock session state: {}", e))?;

        if !session.clock.is_running {
            return Ok(None);
        }

        let transition = if session.clock.tick() {
            Some(apply_transition(&mut session, &settings))
        } else {
            None
        };

        let snapshot = session.snapshot();
        drop(session);

        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send timer snapshot update: {}", e);
        }

        if let Some(transition) = &transition {
            self.send_playback_command(PlaybackCommand::Intent(transition.intent));
        }

        Ok(transition)
    }

    /// Reset the whole session back to its initial state (first work phase,
    /// all counters cleared)
    pub fn reset_session(&self) -> Result<TimerSnapshot, String> {
        let settings = self.get_settings()?;
        self.update_session("reset-session", |session| {
            *session = Session::new(&settings);
            session.snapshot()
        })
    }

    /// Replace the timer settings.
    ///
    /// Rejects invalid settings. If the new settings change the duration of
    /// the phase that is currently running, its remaining time is set exactly
    /// to the new configured duration; phases already departed are never
    /// adjusted retroactively.
    pub fn update_settings(&self, new_settings: TimerSettings) -> Result<TimerSettings, String> {
        new_settings.validate()?;

        let old_settings = {
            let mut settings = self
                .settings
                .lock()
                .map_err(|e| format!("Failed to lock settings: {}", e))?;
            std::mem::replace(&mut *settings, new_settings.clone())
        };

        self.update_session("settings", |session| {
            let phase = session.sequencer.current_phase;
            let old_duration = old_settings.duration_seconds(phase);
            let new_duration = new_settings.duration_seconds(phase);
            if old_duration != new_duration {
                let was_running = session.clock.is_running;
                session.clock.reset(new_duration as i64);
                if was_running {
                    session.clock.start();
                }
                info!(
                    "Settings changed the active {} duration, remaining time set to {}s",
                    phase.label(),
                    new_duration
                );
            }
        })?;

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_settings(&new_settings) {
                warn!("Failed to persist settings: {}", e);
            }
        }

        Ok(new_settings)
    }

    /// Get a clone of the current timer settings
    pub fn get_settings(&self) -> Result<TimerSettings, String> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|e| format!("Failed to lock settings: {}", e))
    }

    /// Get the current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.session
            .lock()
            .map(|session| session.snapshot())
            .map_err(|e| format!("Failed to lock session state: {}", e))
    }

    /// Get the current playback mirror state
    pub fn get_player_state(&self) -> Result<PlayerState, String> {
        self.player
            .lock()
            .map(|player| player.clone())
            .map_err(|e| format!("Failed to lock player state: {}", e))
    }

    /// Record an externally-triggered playback change (e.g. the user paused
    /// from their phone). Authoritative for the mirror, never a phase
    /// transition trigger.
    pub fn set_external_playback(&self, is_playing: bool) -> Result<(), String> {
        let mut player = self
            .player
            .lock()
            .map_err(|e| format!("Failed to lock player state: {}", e))?;
        player.is_playing = is_playing;
        info!("External playback change reported: playing={}", is_playing);
        Ok(())
    }

    /// Toggle playback on the active device, returning the intent that was sent
    pub fn toggle_playback(&self) -> Result<PlaybackIntent, String> {
        let intent = {
            let mut player = self
                .player
                .lock()
                .map_err(|e| format!("Failed to lock player state: {}", e))?;
            if player.is_playing {
                player.is_playing = false;
                PlaybackIntent::Pause
            } else {
                player.is_playing = true;
                PlaybackIntent::Resume
            }
        };

        self.send_playback_command(PlaybackCommand::Intent(intent));
        Ok(intent)
    }

    /// Request the next track on the active device
    pub fn skip_next(&self) {
        self.send_playback_command(PlaybackCommand::SkipNext);
    }

    /// Request the previous track on the active device
    pub fn skip_previous(&self) {
        self.send_playback_command(PlaybackCommand::SkipPrevious);
    }

    /// Store a freshly exchanged access token
    pub fn login(&self, access_token: String) -> Result<(), String> {
        {
            let mut token = self
                .token
                .lock()
                .map_err(|e| format!("Failed to lock token: {}", e))?;
            *token = Some(access_token.clone());
        }

        {
            let mut player = self
                .player
                .lock()
                .map_err(|e| format!("Failed to lock player state: {}", e))?;
            player.authenticated = true;
            player.clear_errors();
        }

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_token(&access_token) {
                warn!("Failed to persist token: {}", e);
            }
        }

        info!("Spotify login completed");
        Ok(())
    }

    /// Clear the token and destroy the running session.
    ///
    /// Logging out pauses playback and resets the timer to its initial state.
    pub fn logout(&self) -> Result<(), String> {
        {
            let mut token = self
                .token
                .lock()
                .map_err(|e| format!("Failed to lock token: {}", e))?;
            *token = None;
        }

        {
            let mut player = self
                .player
                .lock()
                .map_err(|e| format!("Failed to lock player state: {}", e))?;
            player.authenticated = false;
            player.is_playing = false;
        }

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.clear_token() {
                warn!("Failed to remove persisted token: {}", e);
            }
        }

        self.send_playback_command(PlaybackCommand::Intent(PlaybackIntent::Pause));
        self.reset_session()?;
        info!("Logged out of Spotify, session reset");
        Ok(())
    }

    /// Forced logout after the playback API rejected the token
    pub fn force_logout(&self, reason: String) {
        warn!("Forcing logout: {}", reason);
        if let Err(e) = self.add_playback_error(reason) {
            warn!("Failed to record auth error: {}", e);
        }
        if let Err(e) = self.logout() {
            warn!("Failed to complete forced logout: {}", e);
        }
    }

    /// Get a clone of the current access token, if logged in
    pub fn get_token(&self) -> Result<Option<String>, String> {
        self.token
            .lock()
            .map(|token| token.clone())
            .map_err(|e| format!("Failed to lock token: {}", e))
    }

    /// Surface a playback error for client visibility
    pub fn add_playback_error(&self, error: String) -> Result<(), String> {
        let mut player = self
            .player
            .lock()
            .map_err(|e| format!("Failed to lock player state: {}", e))?;
        warn!("Recording playback error: {}", error);
        player.add_error(error);
        Ok(())
    }

    /// Dismiss all surfaced playback errors
    pub fn clear_playback_errors(&self) -> Result<(), String> {
        let mut player = self
            .player
            .lock()
            .map_err(|e| format!("Failed to lock player state: {}", e))?;
        player.clear_errors();
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn send_playback_command(&self, command: PlaybackCommand) {
        // Send fails when no dispatch task is subscribed (unit tests); the
        // timer must keep working regardless
        if self.playback_tx.send(command).is_err() {
            warn!("No playback dispatcher listening for {:?}", command);
        }
    }
}

/// End the current phase and enter the next one: sequencer transition plus
/// clock reload, under the caller's session lock. The next phase enters
/// running so the cycle continues without user input.
fn apply_transition(session: &mut Session, settings: &TimerSettings) -> PhaseTransition {
    let transition = session.sequencer.advance(settings);
    session.clock.reset(transition.next_duration_seconds as i64);
    session.clock.start();
    transition
}
