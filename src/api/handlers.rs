//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json, Redirect},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    config::TimerSettings,
    services::{authorize_url, exchange_code},
    state::{AppState, PlaybackIntent, TimerSnapshot},
};

use super::responses::{ApiResponse, HealthResponse, PlaybackStateBody, StatusResponse};

fn snapshot_or_500(state: &AppState) -> Result<TimerSnapshot, StatusCode> {
    state.get_snapshot().map_err(|e| {
        error!("Failed to get timer snapshot: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle POST /timer/start - Start the session clock
pub async fn timer_start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start_timer() {
        Ok(timer) => {
            info!("Timer started: {} with {}s remaining", timer.phase_label, timer.remaining_seconds);
            Ok(Json(ApiResponse::ok("Timer started".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/pause - Pause the session clock
pub async fn timer_pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.pause_timer() {
        Ok(timer) => {
            info!("Timer paused with {}s remaining", timer.remaining_seconds);
            Ok(Json(ApiResponse::ok("Timer paused".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to pause timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/reset - Reset the current phase to its configured duration
pub async fn timer_reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset_timer() {
        Ok(timer) => {
            info!("Timer reset: {} back to {}s", timer.phase_label, timer.remaining_seconds);
            Ok(Json(ApiResponse::ok("Timer reset".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/skip - Skip to the next phase
pub async fn timer_skip_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.skip_phase() {
        Ok(timer) => {
            info!("Skipped to {}", timer.phase_label);
            Ok(Json(ApiResponse::ok(
                format!("Skipped to {}", timer.phase_label),
                timer,
            )))
        }
        Err(e) => {
            error!("Failed to skip phase: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /settings - Return the current timer settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerSettings>, StatusCode> {
    match state.get_settings() {
        Ok(settings) => Ok(Json(settings)),
        Err(e) => {
            error!("Failed to get settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /settings - Replace the timer settings.
///
/// Invalid settings (zero durations, interval below 1) are rejected with 400
/// and leave the previous settings untouched.
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<TimerSettings>,
) -> Result<Json<TimerSettings>, (StatusCode, String)> {
    match state.update_settings(settings) {
        Ok(settings) => {
            info!(
                "Settings updated: work={}m break={}m long={}m intervals={}",
                settings.work_minutes,
                settings.break_minutes,
                settings.long_break_minutes,
                settings.intervals_before_long_break
            );
            Ok(Json(settings))
        }
        Err(e) => {
            warn!("Rejected settings update: {}", e);
            Err((StatusCode::BAD_REQUEST, e))
        }
    }
}

/// Handle POST /playback/toggle - Toggle play/pause on the active device
pub async fn playback_toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let intent = state.toggle_playback().map_err(|e| {
        error!("Failed to toggle playback: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let message = match intent {
        PlaybackIntent::Resume => "Playback resume requested",
        PlaybackIntent::Pause => "Playback pause requested",
        PlaybackIntent::Unchanged => "Playback unchanged",
    };

    let timer = snapshot_or_500(&state)?;
    Ok(Json(ApiResponse::ok(message.to_string(), timer)))
}

/// Handle POST /playback/next - Skip to the next track
pub async fn playback_next_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.skip_next();
    let timer = snapshot_or_500(&state)?;
    Ok(Json(ApiResponse::ok("Next track requested".to_string(), timer)))
}

/// Handle POST /playback/previous - Skip to the previous track
pub async fn playback_previous_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.skip_previous();
    let timer = snapshot_or_500(&state)?;
    Ok(Json(ApiResponse::ok(
        "Previous track requested".to_string(),
        timer,
    )))
}

/// Handle POST /playback/state - Externally-triggered playback change.
///
/// This is the one callback the playback collaborator reports into: it
/// overrides the local playback mirror and never triggers a phase transition.
pub async fn playback_state_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlaybackStateBody>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if let Err(e) = state.set_external_playback(body.is_playing) {
        error!("Failed to record external playback change: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let timer = snapshot_or_500(&state)?;
    Ok(Json(ApiResponse::ok(
        "Playback state recorded".to_string(),
        timer,
    )))
}

/// Query parameters of the OAuth redirect back from Spotify
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Handle GET /login - Redirect the popup to the Spotify authorize page
pub async fn login_handler(State(state): State<Arc<AppState>>) -> Result<Redirect, StatusCode> {
    match authorize_url(&state.credentials) {
        Ok(url) => {
            info!("Redirecting login popup to Spotify authorize page");
            Ok(Redirect::temporary(&url))
        }
        Err(e) => {
            error!("Failed to build authorize URL: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /callback - OAuth code-for-token exchange.
///
/// Returns the popup-closing page that posts the token (or an error) back to
/// the opener window, matching the message shape the front end listens for.
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> (StatusCode, Html<String>) {
    if let Some(error) = query.error {
        warn!("Spotify authorize page returned an error: {}", error);
        return (StatusCode::BAD_REQUEST, Html(popup_error_page(&error)));
    }

    let Some(code) = query.code else {
        warn!("Callback called without an authorization code");
        return (
            StatusCode::BAD_REQUEST,
            Html(popup_error_page("missing authorization code")),
        );
    };

    match exchange_code(&state.credentials, &code).await {
        Ok(access_token) => {
            if let Err(e) = state.login(access_token.clone()) {
                error!("Failed to store access token: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(popup_error_page("failed to store token")),
                );
            }
            (StatusCode::OK, Html(popup_token_page(&access_token)))
        }
        Err(e) => {
            error!("Token exchange failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Html(popup_error_page("Error getting token")),
            )
        }
    }
}

/// Handle POST /logout - Clear the token and reset the session
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.logout() {
        Ok(()) => {
            let timer = snapshot_or_500(&state)?;
            Ok(Json(ApiResponse::ok("Logged out".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to log out: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the full server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = snapshot_or_500(&state)?;

    let settings = state.get_settings().map_err(|e| {
        error!("Failed to get settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let player = state.get_player_state().map_err(|e| {
        error!("Failed to get player state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        settings,
        player,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Popup page posting the token to the opener window and closing itself
fn popup_token_page(access_token: &str) -> String {
    let payload = serde_json::json!({
        "type": "SPOTIFY_TOKEN",
        "accessToken": access_token,
    });
    format!(
        "<script>\nwindow.opener.postMessage({payload}, '*');\nwindow.close();\n</script>"
    )
}

/// Popup page posting the error to the opener window and closing itself
fn popup_error_page(message: &str) -> String {
    let payload = serde_json::json!({
        "type": "SPOTIFY_ERROR",
        "error": message,
    });
    format!(
        "<script>\nwindow.opener.postMessage({payload}, '*');\nwindow.close();\n</script>"
    )
}
