//! Playback command dispatch background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{
    services::PlaybackController,
    state::{AppState, PlaybackCommand, PlaybackIntent},
};

/// Background task that forwards playback commands from the core to the
/// external playback controller.
///
/// Every call is fire-and-forget as far as the timer is concerned: failures
/// are surfaced to the client error list (or force a logout when the token
/// was rejected) and nothing is retried until the next user action.
pub async fn playback_dispatch_task(state: Arc<AppState>, controller: Arc<dyn PlaybackController>) {
    info!("Starting playback dispatch task");

    let mut commands = state.playback_tx.subscribe();

    loop {
        let command = match commands.recv().await {
            Ok(command) => command,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Playback dispatcher lagged, {} commands dropped", skipped);
                continue;
            }
            Err(RecvError::Closed) => {
                info!("Playback command channel closed, stopping dispatcher");
                break;
            }
        };

        let token = match state.get_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("Ignoring {:?}: not logged in to Spotify", command);
                continue;
            }
            Err(e) => {
                error!("Failed to read token for playback command: {}", e);
                continue;
            }
        };

        let result = match command {
            PlaybackCommand::Intent(PlaybackIntent::Resume) => controller.resume(&token).await,
            PlaybackCommand::Intent(PlaybackIntent::Pause) => controller.pause(&token).await,
            PlaybackCommand::Intent(PlaybackIntent::Unchanged) => Ok(()),
            PlaybackCommand::SkipNext => controller.skip_next(&token).await,
            PlaybackCommand::SkipPrevious => controller.skip_previous(&token).await,
        };

        if let Err(err) = result {
            if err.is_auth() {
                state.force_logout(err.to_string());
            } else {
                error!("Playback command {:?} failed: {}", command, err);
                if let Err(e) = state.add_playback_error(err.to_string()) {
                    error!("Failed to record playback error: {}", e);
                }
            }
        }
    }
}
