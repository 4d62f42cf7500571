//! Error kinds for the Spotify service boundary

use thiserror::Error;

/// Errors surfaced by the auth and playback services.
///
/// None of these are fatal to the timer; the clock and sequencer keep running
/// regardless. `Auth` triggers a forced logout, everything else is recorded
/// for the client and retried only on the next user action.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Token exchange failed or the playback API rejected the token
    #[error("authorization failed: {0}")]
    Auth(String),

    /// No access token is held; the user must log in first
    #[error("not logged in to Spotify")]
    NotAuthenticated,

    /// Transient network or API failure during a play/skip call
    #[error("playback API request failed: {0}")]
    Api(#[from] reqwest::Error),

    /// The playback API returned an unexpected status
    #[error("playback API returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

impl PlaybackError {
    /// Whether this error invalidates the session and requires re-login
    pub fn is_auth(&self) -> bool {
        matches!(self, PlaybackError::Auth(_) | PlaybackError::NotAuthenticated)
    }
}
