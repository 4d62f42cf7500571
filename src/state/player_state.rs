//! Playback device mirror and surfaced playback errors

use serde::{Deserialize, Serialize};

/// Local mirror of the external Spotify playback device.
///
/// `is_playing` is authoritative only as a reflection: it is overwritten by
/// externally-reported changes (e.g. the user pausing from their phone) and
/// never drives a phase transition. Errors from playback calls land here for
/// client visibility; none of them affect the timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Whether the active device is believed to be playing
    pub is_playing: bool,
    /// Whether an access token is currently held
    pub authenticated: bool,
    /// List of current playback errors for client visibility
    pub errors: Vec<String>,
}

impl PlayerState {
    /// Create a new PlayerState with no device activity and no token
    pub fn new() -> Self {
        Self {
            is_playing: false,
            authenticated: false,
            errors: Vec::new(),
        }
    }

    /// Add an error to the state
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Clear all recorded playback errors
    pub fn clear_errors(&mut self) {
        if !self.errors.is_empty() {
            tracing::info!("Cleared {} playback errors", self.errors.len());
            self.errors.clear();
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}
