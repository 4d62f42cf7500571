//! Session clock tick background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{error, info};

use crate::state::AppState;

/// The single recurring scheduled operation in the server: one tick per
/// second, for the lifetime of the process.
///
/// Each tick goes through `AppState::advance_tick`, which holds the session
/// lock for both the decrement and any resulting phase transition, so a later
/// tick can never observe a half-finished transition. Ticks while the clock
/// is paused or expired are no-ops.
pub async fn session_tick_task(state: Arc<AppState>) {
    info!("Starting session tick task");

    let mut interval = interval(Duration::from_secs(1));

    loop {
        interval.tick().await;

        match state.advance_tick() {
            Ok(Some(transition)) => {
                info!(
                    "Phase expired, entering {} for {}s",
                    transition.next_phase.label(),
                    transition.next_duration_seconds
                );

                match state.get_settings() {
                    Ok(settings) if settings.chime_enabled => {
                        info!("Session chime: {}", transition.next_phase.label());
                    }
                    Ok(_) => {}
                    Err(e) => error!("Failed to read settings after transition: {}", e),
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to advance session clock: {}", e);
            }
        }
    }
}
