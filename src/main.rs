//! Pomodorify - A state-managed HTTP server for Pomodoro sessions with
//! Spotify playback control
//!
//! This is the main entry point for the pomodorify application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use pomodorify::{
    api::create_router,
    config::Config,
    services::{SpotifyCredentials, SpotifyPlayback},
    state::AppState,
    storage::Storage,
    tasks::{playback_dispatch_task, session_tick_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodorify={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodorify server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, work={}min, break={}min, long break={}min, intervals={}",
        config.host, config.port, config.work, config.break_minutes, config.long_break, config.intervals
    );

    if config.client_id.is_empty() || config.client_secret.is_empty() {
        warn!("Spotify credentials not configured; /login and /callback will not work");
    }

    // Open persisted storage; a broken data directory degrades to in-memory state
    let storage = match Storage::new(&config.data_dir) {
        Ok(storage) => Some(storage),
        Err(e) => {
            warn!("Failed to open data directory {}: {}", config.data_dir, e);
            None
        }
    };

    // Persisted settings win over CLI flags; both must pass validation
    let settings = storage
        .as_ref()
        .and_then(|s| s.load_settings())
        .unwrap_or_else(|| config.timer_settings());
    if let Err(e) = settings.validate() {
        tracing::error!("Invalid timer settings: {}", e);
        std::process::exit(1);
    }

    let credentials = SpotifyCredentials {
        client_id: config.client_id.clone(),
        client_secret: config.client_secret.clone(),
        redirect_uri: config.redirect_uri.clone(),
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        settings,
        credentials,
        storage,
    ));

    // Start the session tick background task
    let tick_state = Arc::clone(&state);
    tokio::spawn(async move {
        session_tick_task(tick_state).await;
    });

    // Start the playback dispatch background task
    let playback_state = Arc::clone(&state);
    let controller = Arc::new(SpotifyPlayback::new());
    tokio::spawn(async move {
        playback_dispatch_task(playback_state, controller).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start        - Start the session clock");
    info!("  POST /timer/pause        - Pause the session clock");
    info!("  POST /timer/reset        - Reset the current phase");
    info!("  POST /timer/skip         - Skip to the next phase");
    info!("  GET  /settings           - Read timer settings");
    info!("  PUT  /settings           - Update timer settings");
    info!("  POST /playback/toggle    - Toggle play/pause");
    info!("  POST /playback/next      - Next track");
    info!("  POST /playback/previous  - Previous track");
    info!("  POST /playback/state     - Report external playback change");
    info!("  GET  /login              - Redirect to Spotify authorize");
    info!("  GET  /callback           - OAuth token exchange");
    info!("  POST /logout             - Clear token, reset session");
    info!("  GET  /status             - Current status and timer");
    info!("  GET  /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
