//! External Spotify services
//!
//! OAuth token exchange and the playback controller the dispatch task talks
//! to. Nothing in here mutates timer state.

pub mod auth;
pub mod playback;

pub use auth::{authorize_url, exchange_code, SpotifyCredentials};
pub use playback::{PlaybackController, SpotifyPlayback};
