//! Spotify OAuth: authorize-URL construction and the code-for-token exchange

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::PlaybackError;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Scopes required for the playback widget
const SCOPES: &str =
    "streaming user-read-email user-read-private user-read-playback-state user-modify-playback-state";

/// Spotify application credentials from the server configuration
#[derive(Debug, Clone, Default)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Build the accounts.spotify.com authorize URL the login popup is sent to
pub fn authorize_url(credentials: &SpotifyCredentials) -> Result<String, PlaybackError> {
    let url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("response_type", "code"),
            ("client_id", credentials.client_id.as_str()),
            ("scope", SCOPES),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ],
    )
    .map_err(|e| PlaybackError::Auth(format!("invalid authorize URL: {}", e)))?;

    Ok(url.into())
}

/// Exchange an authorization code for an access token.
///
/// Posts to the accounts token endpoint with Basic auth of
/// `client_id:client_secret`, exactly as the browser popup's opener expects.
pub async fn exchange_code(
    credentials: &SpotifyCredentials,
    code: &str,
) -> Result<String, PlaybackError> {
    debug!("Exchanging authorization code for access token");

    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PlaybackError::Auth(format!(
            "token exchange returned {}: {}",
            status, body
        )));
    }

    let token: TokenResponse = response.json().await?;
    info!("Token exchange completed");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
        }
    }

    #[test]
    fn test_authorize_url_carries_all_params() {
        let url = authorize_url(&credentials()).unwrap();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8888%2Fcallback"));
        assert!(url.contains("streaming"));
        assert!(url.contains("user-modify-playback-state"));
    }
}
