//! Session sequencer: the work/break/long-break state machine

use serde::{Deserialize, Serialize};

use crate::config::TimerSettings;

/// One contiguous interval of the Pomodoro cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionPhase {
    /// Display label matching the front end's phase banner
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Work => "Work Session",
            SessionPhase::ShortBreak => "Break Session",
            SessionPhase::LongBreak => "Long Break Session",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionPhase::Work)
    }
}

/// Advisory playback signal emitted towards the external playback controller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackIntent {
    Resume,
    Pause,
    Unchanged,
}

/// Outcome of a phase transition: the phase entered, how long it runs,
/// and what the playback device should do about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub next_phase: SessionPhase,
    pub next_duration_seconds: u64,
    pub intent: PlaybackIntent,
}

/// State machine over {Work, ShortBreak, LongBreak}.
///
/// Owns the phase and the session counters; translates a phase ending
/// (natural expiry or manual skip, identically) into the next phase and its
/// configured duration. The long break is selected purely by
/// `completed_work_sessions % intervals_before_long_break == 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sequencer {
    pub current_phase: SessionPhase,
    /// Work phases completed (by timeout or skip), drives long-break selection
    pub completed_work_sessions: u64,
    /// Display counter, 1-based, increments on every Work entry
    pub work_session_count: u64,
    /// Display counter, increments on every break entry
    pub break_session_count: u64,
}

impl Sequencer {
    /// Initial state: first work session, nothing completed yet
    pub fn new() -> Self {
        Self {
            current_phase: SessionPhase::Work,
            completed_work_sessions: 0,
            work_session_count: 1,
            break_session_count: 0,
        }
    }

    /// End the current phase and enter the next one.
    ///
    /// Called for both natural clock expiry and explicit skip; the two are
    /// indistinguishable here so a skip can never double-count a session.
    pub fn advance(&mut self, settings: &TimerSettings) -> PhaseTransition {
        let next_phase = match self.current_phase {
            SessionPhase::Work => {
                self.completed_work_sessions += 1;
                self.break_session_count += 1;
                if self.completed_work_sessions % settings.intervals_before_long_break == 0 {
                    SessionPhase::LongBreak
                } else {
                    SessionPhase::ShortBreak
                }
            }
            SessionPhase::ShortBreak | SessionPhase::LongBreak => {
                self.work_session_count += 1;
                SessionPhase::Work
            }
        };

        self.current_phase = next_phase;

        PhaseTransition {
            next_phase,
            next_duration_seconds: settings.duration_seconds(next_phase),
            intent: if settings.auto_resume_playback {
                PlaybackIntent::Resume
            } else {
                PlaybackIntent::Pause
            },
        }
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TimerSettings {
        TimerSettings::default()
    }

    #[test]
    fn test_initial_state() {
        let seq = Sequencer::new();
        assert_eq!(seq.current_phase, SessionPhase::Work);
        assert_eq!(seq.completed_work_sessions, 0);
        assert_eq!(seq.work_session_count, 1);
        assert_eq!(seq.break_session_count, 0);
    }

    #[test]
    fn test_default_cycle_break_sequence() {
        // 25/5/15 with a long break every 4th completed work session
        let settings = settings();
        let mut seq = Sequencer::new();
        let mut breaks = Vec::new();
        let mut work_counts = vec![seq.work_session_count];

        for _ in 0..4 {
            let transition = seq.advance(&settings);
            breaks.push(transition.next_phase);
            let transition = seq.advance(&settings);
            assert_eq!(transition.next_phase, SessionPhase::Work);
            work_counts.push(seq.work_session_count);
        }

        assert_eq!(
            breaks,
            vec![
                SessionPhase::ShortBreak,
                SessionPhase::ShortBreak,
                SessionPhase::ShortBreak,
                SessionPhase::LongBreak,
            ]
        );
        assert_eq!(work_counts, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_long_break_every_nth_work_session() {
        for n in 1..=6 {
            let mut settings = settings();
            settings.intervals_before_long_break = n;
            let mut seq = Sequencer::new();

            for completed in 1..=(n * 3) {
                let transition = seq.advance(&settings);
                let expected = if completed % n == 0 {
                    SessionPhase::LongBreak
                } else {
                    SessionPhase::ShortBreak
                };
                assert_eq!(transition.next_phase, expected, "n={n} completed={completed}");
                seq.advance(&settings);
            }
        }
    }

    #[test]
    fn test_break_durations() {
        let settings = settings();
        let mut seq = Sequencer::new();
        seq.completed_work_sessions = 2;

        let transition = seq.advance(&settings);
        assert_eq!(transition.next_phase, SessionPhase::ShortBreak);
        assert_eq!(transition.next_duration_seconds, settings.break_minutes * 60);

        let transition = seq.advance(&settings);
        assert_eq!(transition.next_phase, SessionPhase::Work);
        assert_eq!(transition.next_duration_seconds, settings.work_minutes * 60);

        let transition = seq.advance(&settings);
        assert_eq!(transition.next_phase, SessionPhase::LongBreak);
        assert_eq!(
            transition.next_duration_seconds,
            settings.long_break_minutes * 60
        );
    }

    #[test]
    fn test_work_completion_counted_once_per_advance() {
        let settings = settings();
        let mut seq = Sequencer::new();

        seq.advance(&settings);
        assert_eq!(seq.completed_work_sessions, 1);
        assert_eq!(seq.break_session_count, 1);

        // Finishing a break must not count another work session
        seq.advance(&settings);
        assert_eq!(seq.completed_work_sessions, 1);
        assert_eq!(seq.break_session_count, 1);
        assert_eq!(seq.work_session_count, 2);
    }

    #[test]
    fn test_intent_follows_auto_resume_setting() {
        let mut settings = settings();
        settings.auto_resume_playback = true;
        let mut seq = Sequencer::new();
        assert_eq!(seq.advance(&settings).intent, PlaybackIntent::Resume);

        settings.auto_resume_playback = false;
        for _ in 0..6 {
            assert_ne!(seq.advance(&settings).intent, PlaybackIntent::Resume);
        }
    }
}
