//! External playback contract and its Spotify Web API implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::PlaybackError;

const PLAYER_BASE_URL: &str = "https://api.spotify.com/v1/me/player";

/// The four operations the core is allowed to ask of the external playback
/// device. Implementations own all vendor detail; callers treat every call as
/// fire-and-forget and never let a failure touch the timer state machine.
#[async_trait]
pub trait PlaybackController: Send + Sync {
    async fn resume(&self, token: &str) -> Result<(), PlaybackError>;
    async fn pause(&self, token: &str) -> Result<(), PlaybackError>;
    async fn skip_next(&self, token: &str) -> Result<(), PlaybackError>;
    async fn skip_previous(&self, token: &str) -> Result<(), PlaybackError>;
}

/// Playback controller backed by the Spotify Web API player endpoints
#[derive(Debug, Clone)]
pub struct SpotifyPlayback {
    client: Client,
    base_url: String,
}

impl SpotifyPlayback {
    pub fn new() -> Self {
        Self::with_base_url(PLAYER_BASE_URL.to_string())
    }

    /// Controller against a non-default player endpoint (used by tests)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn put(&self, path: &str, token: &str) -> Result<(), PlaybackError> {
        let response = self
            .client
            .put(format!("{}/{}", self.base_url, path))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        Self::check(response.status())
    }

    async fn post(&self, path: &str, token: &str) -> Result<(), PlaybackError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        Self::check(response.status())
    }

    fn check(status: StatusCode) -> Result<(), PlaybackError> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PlaybackError::Auth(format!(
                "player API rejected the token ({})",
                status
            ))),
            s => Err(PlaybackError::UnexpectedStatus(s)),
        }
    }
}

impl Default for SpotifyPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackController for SpotifyPlayback {
    async fn resume(&self, token: &str) -> Result<(), PlaybackError> {
        debug!("Requesting playback resume");
        self.put("play", token).await
    }

    async fn pause(&self, token: &str) -> Result<(), PlaybackError> {
        debug!("Requesting playback pause");
        self.put("pause", token).await
    }

    async fn skip_next(&self, token: &str) -> Result<(), PlaybackError> {
        debug!("Requesting next track");
        self.post("next", token).await
    }

    async fn skip_previous(&self, token: &str) -> Result<(), PlaybackError> {
        debug!("Requesting previous track");
        self.post("previous", token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(SpotifyPlayback::check(StatusCode::NO_CONTENT).is_ok());
        assert!(SpotifyPlayback::check(StatusCode::OK).is_ok());

        assert!(matches!(
            SpotifyPlayback::check(StatusCode::UNAUTHORIZED),
            Err(PlaybackError::Auth(_))
        ));
        assert!(matches!(
            SpotifyPlayback::check(StatusCode::FORBIDDEN),
            Err(PlaybackError::Auth(_))
        ));
        assert!(matches!(
            SpotifyPlayback::check(StatusCode::NOT_FOUND),
            Err(PlaybackError::UnexpectedStatus(_))
        ));
    }

    #[test]
    fn test_auth_errors_force_relogin() {
        assert!(PlaybackError::Auth("expired".to_string()).is_auth());
        assert!(PlaybackError::NotAuthenticated.is_auth());
        assert!(!PlaybackError::UnexpectedStatus(StatusCode::NOT_FOUND).is_auth());
    }
}
