//! Background tasks
//!
//! The one-second session tick and the playback command dispatcher.

pub mod playback;
pub mod tick;

pub use playback::playback_dispatch_task;
pub use tick::session_tick_task;
