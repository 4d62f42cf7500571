//! Session state management
//!
//! The clock counts seconds, the sequencer owns the work/break cycle, and
//! `AppState` ties them together behind one lock.

pub mod app_state;
pub mod clock;
pub mod player_state;
pub mod sequencer;

pub use app_state::{AppState, PlaybackCommand, TimerSnapshot};
pub use clock::SessionClock;
pub use player_state::PlayerState;
pub use sequencer::{PhaseTransition, PlaybackIntent, Sequencer, SessionPhase};
